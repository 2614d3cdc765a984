//! Native library ABI
//!
//! This module describes the function table the binding drives. Everything the
//! binding knows about the media service goes through [`NativeLibrary`]: opaque
//! references in, opaque references and plain scalars out, and completion
//! callbacks that may fire from the library's own processing thread.
//!
//! - `records`: plain data the backends hand to the engine
//! - `engine`: reference-counted object table and processing loop
//! - `memory`: in-process catalog backend (tests, offline demo)
//! - `web_api`: Spotify Web API backend built on rspotify

mod engine;
mod records;
pub mod memory;
pub mod web_api;

use std::fmt;
use std::num::NonZeroU64;

pub use engine::{Engine, Fetcher};
pub use records::{
    AlbumRecord, ArtistRecord, BrowseRecord, FetchResult, Metadata, MetadataKind, Paged, PlaylistRecord,
    SearchRequest, SearchResults, TrackRecord, Window,
};

/// Opaque native reference. Never null.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawRef(NonZeroU64);

impl RawRef {
    /// Returns `None` for the null reference.
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RawRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Userdata passed through a native async call and handed back to its callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackToken(u64);

impl CallbackToken {
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Completion callback. Invoked exactly once per async request, from the
/// native processing thread, with the completed reference or `None` when the
/// library gave up on the request.
pub type CompletionCallback = fn(Option<RawRef>, CallbackToken);

/// Native error status, reported verbatim through `status()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok,
    IsLoading,
    InvalidIndata,
    NetworkDisabled,
    RateLimited,
    OtherTransient,
    OtherPermanent,
}

impl ErrorCode {
    /// Human readable explanation of the status.
    pub fn explain(self) -> &'static str {
        match self {
            ErrorCode::Ok => "no error",
            ErrorCode::IsLoading => "resource is still loading",
            ErrorCode::InvalidIndata => "invalid input data",
            ErrorCode::NetworkDisabled => "network access is disabled",
            ErrorCode::RateLimited => "request was rate limited by the service",
            ErrorCode::OtherTransient => "transient failure, the request may be retried",
            ErrorCode::OtherPermanent => "permanent failure",
        }
    }

    pub fn is_ok(self) -> bool {
        self == ErrorCode::Ok
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.explain())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Standard,
    Suggest,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    #[default]
    Normal,
    Large,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArtistBrowseType {
    #[default]
    Full,
    NoTracks,
    NoAlbums,
}

/// The native function table.
///
/// Every function returning a `RawRef` hands the caller a new owned reference;
/// the caller releases it with the matching `*_release` function exactly once.
/// Accessors on an unknown or released reference return the empty value for
/// their type. Index accessors return `None` past the end of their collection.
pub trait NativeLibrary: Send + Sync {
    // ========================================================================
    // Session
    // ========================================================================

    fn session_create(&self) -> Option<RawRef>;
    fn session_release(&self, session: RawRef);

    // ========================================================================
    // Search
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn search_create(
        &self,
        session: RawRef,
        query: &str,
        tracks_offset: u32,
        tracks: u32,
        albums_offset: u32,
        albums: u32,
        artists_offset: u32,
        artists: u32,
        playlists_offset: u32,
        playlists: u32,
        search_type: SearchType,
        callback: CompletionCallback,
        userdata: CallbackToken,
    ) -> Option<RawRef>;
    fn search_is_loaded(&self, search: RawRef) -> bool;
    fn search_error(&self, search: RawRef) -> ErrorCode;
    fn search_query(&self, search: RawRef) -> String;
    fn search_did_you_mean(&self, search: RawRef) -> String;
    fn search_num_tracks(&self, search: RawRef) -> usize;
    fn search_track(&self, search: RawRef, index: usize) -> Option<RawRef>;
    fn search_total_tracks(&self, search: RawRef) -> usize;
    fn search_num_albums(&self, search: RawRef) -> usize;
    fn search_album(&self, search: RawRef, index: usize) -> Option<RawRef>;
    fn search_total_albums(&self, search: RawRef) -> usize;
    fn search_num_artists(&self, search: RawRef) -> usize;
    fn search_artist(&self, search: RawRef, index: usize) -> Option<RawRef>;
    fn search_total_artists(&self, search: RawRef) -> usize;
    fn search_num_playlists(&self, search: RawRef) -> usize;
    fn search_playlist_name(&self, search: RawRef, index: usize) -> Option<String>;
    fn search_playlist_uri(&self, search: RawRef, index: usize) -> Option<String>;
    fn search_playlist_image_uri(&self, search: RawRef, index: usize) -> Option<String>;
    fn search_total_playlists(&self, search: RawRef) -> usize;
    fn search_release(&self, search: RawRef);

    // ========================================================================
    // Artist
    // ========================================================================

    fn artist_is_loaded(&self, artist: RawRef) -> bool;
    fn artist_name(&self, artist: RawRef) -> Option<String>;
    fn artist_portrait(&self, artist: RawRef, size: ImageSize) -> Option<RawRef>;
    fn artist_release(&self, artist: RawRef);

    // ========================================================================
    // Track & Album
    // ========================================================================

    fn track_is_loaded(&self, track: RawRef) -> bool;
    fn track_error(&self, track: RawRef) -> ErrorCode;
    fn track_name(&self, track: RawRef) -> Option<String>;
    fn track_duration(&self, track: RawRef) -> u32;
    fn track_album(&self, track: RawRef) -> Option<RawRef>;
    fn track_release(&self, track: RawRef);

    fn album_is_loaded(&self, album: RawRef) -> bool;
    fn album_name(&self, album: RawRef) -> Option<String>;
    fn album_year(&self, album: RawRef) -> Option<i32>;
    fn album_artist(&self, album: RawRef) -> Option<RawRef>;
    fn album_release(&self, album: RawRef);

    // ========================================================================
    // Playlist & Image
    // ========================================================================

    fn playlist_create(&self, session: RawRef, link: &str) -> Option<RawRef>;
    fn playlist_is_loaded(&self, playlist: RawRef) -> bool;
    fn playlist_name(&self, playlist: RawRef) -> Option<String>;
    fn playlist_owner(&self, playlist: RawRef) -> Option<String>;
    fn playlist_release(&self, playlist: RawRef);

    fn image_create_from_link(&self, session: RawRef, link: &str) -> Option<RawRef>;
    fn image_is_loaded(&self, image: RawRef) -> bool;
    fn image_release(&self, image: RawRef);

    // ========================================================================
    // Artist browse
    // ========================================================================

    fn artistbrowse_create(
        &self,
        session: RawRef,
        artist: RawRef,
        browse_type: ArtistBrowseType,
        callback: CompletionCallback,
        userdata: CallbackToken,
    ) -> Option<RawRef>;
    fn artistbrowse_is_loaded(&self, browse: RawRef) -> bool;
    fn artistbrowse_error(&self, browse: RawRef) -> ErrorCode;
    fn artistbrowse_artist(&self, browse: RawRef) -> Option<RawRef>;
    fn artistbrowse_biography(&self, browse: RawRef) -> String;
    fn artistbrowse_num_tracks(&self, browse: RawRef) -> usize;
    fn artistbrowse_track(&self, browse: RawRef, index: usize) -> Option<RawRef>;
    fn artistbrowse_num_albums(&self, browse: RawRef) -> usize;
    fn artistbrowse_album(&self, browse: RawRef, index: usize) -> Option<RawRef>;
    fn artistbrowse_num_portraits(&self, browse: RawRef) -> usize;
    fn artistbrowse_portrait(&self, browse: RawRef, index: usize) -> Option<RawRef>;
    fn artistbrowse_release(&self, browse: RawRef);

    // ========================================================================
    // Links
    // ========================================================================

    fn link_create_from_search(&self, search: RawRef) -> Option<String>;
    fn link_create_from_artist(&self, artist: RawRef) -> Option<String>;
    fn link_create_from_artist_portrait(&self, artist: RawRef, size: ImageSize) -> Option<String>;
    fn link_create_from_track(&self, track: RawRef) -> Option<String>;
    fn link_create_from_album(&self, album: RawRef) -> Option<String>;
    fn link_create_from_playlist(&self, playlist: RawRef) -> Option<String>;
    fn link_create_from_image(&self, image: RawRef) -> Option<String>;
    fn link_as_artist(&self, link: &str) -> Option<RawRef>;
    fn link_as_track(&self, link: &str) -> Option<RawRef>;
    fn link_as_album(&self, link: &str) -> Option<RawRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_ref_rejects_null() {
        assert!(RawRef::new(0).is_none());
        assert_eq!(RawRef::new(7).map(RawRef::get), Some(7));
    }

    #[test]
    fn test_error_code_explain() {
        assert!(ErrorCode::Ok.is_ok());
        assert!(!ErrorCode::OtherTransient.is_ok());
        assert_eq!(ErrorCode::IsLoading.to_string(), "resource is still loading");
    }
}
