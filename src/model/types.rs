//! Search parameters and the per-kind result windows they describe

use serde::Deserialize;

use crate::native::SearchType;

/// One kind of search result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultKind {
    Tracks,
    Albums,
    Artists,
    Playlists,
}

/// Counts and offsets per result kind.
///
/// Values are signed so untrusted input can be carried as-is; they are
/// clamped to `0..=u32::MAX` when flattened for the native call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    pub tracks: i64,
    pub tracks_offset: i64,
    pub albums: i64,
    pub albums_offset: i64,
    pub artists: i64,
    pub artists_offset: i64,
    pub playlists: i64,
    pub playlists_offset: i64,
    #[serde(rename = "type", alias = "search_type")]
    pub search_type: SearchType,
}

pub const DEFAULT_SEARCH_PARAMETERS: SearchParameters = SearchParameters {
    tracks: 25,
    tracks_offset: 0,
    albums: 25,
    albums_offset: 0,
    artists: 25,
    artists_offset: 0,
    playlists: 25,
    playlists_offset: 0,
    search_type: SearchType::Standard,
};

impl Default for SearchParameters {
    fn default() -> Self {
        DEFAULT_SEARCH_PARAMETERS
    }
}

fn clamp(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

impl SearchParameters {
    /// Counts and offsets in native argument order:
    /// `(tracks_offset, tracks, albums_offset, albums, artists_offset,
    /// artists, playlists_offset, playlists)`.
    pub fn positional(&self) -> [u32; 8] {
        [
            clamp(self.tracks_offset),
            clamp(self.tracks),
            clamp(self.albums_offset),
            clamp(self.albums),
            clamp(self.artists_offset),
            clamp(self.artists),
            clamp(self.playlists_offset),
            clamp(self.playlists),
        ]
    }

    /// Where the window of `kind` starts, clamped like [`Self::positional`].
    pub fn offset(&self, kind: ResultKind) -> u32 {
        clamp(match kind {
            ResultKind::Tracks => self.tracks_offset,
            ResultKind::Albums => self.albums_offset,
            ResultKind::Artists => self.artists_offset,
            ResultKind::Playlists => self.playlists_offset,
        })
    }

    /// The same parameters with the window of `kind` moved to `offset`.
    pub fn with_offset(mut self, kind: ResultKind, offset: i64) -> Self {
        match kind {
            ResultKind::Tracks => self.tracks_offset = offset,
            ResultKind::Albums => self.albums_offset = offset,
            ResultKind::Artists => self.artists_offset = offset,
            ResultKind::Playlists => self.playlists_offset = offset,
        }
        self
    }
}
