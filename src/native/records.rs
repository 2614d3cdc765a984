//! Plain data exchanged between a [`Fetcher`](super::Fetcher) and the engine

use std::collections::BTreeMap;

use super::{ErrorCode, ImageSize, SearchType};

/// Result of one backend fetch. Failures are native statuses, not errors.
pub type FetchResult<T> = Result<T, ErrorCode>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    pub duration_ms: u32,
    pub album: Option<AlbumRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumRecord {
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub artist: Option<ArtistRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtistRecord {
    pub id: String,
    pub name: String,
    /// Image ids keyed by size
    pub portraits: BTreeMap<ImageSize, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistRecord {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub image: Option<String>,
}

impl PlaylistRecord {
    pub fn uri(&self) -> String {
        format!("spotify:playlist:{}", self.id)
    }

    pub fn image_uri(&self) -> Option<String> {
        self.image.as_ref().map(|id| format!("spotify:image:{}", id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowseRecord {
    pub artist: ArtistRecord,
    pub biography: String,
    pub tracks: Vec<TrackRecord>,
    pub albums: Vec<AlbumRecord>,
    pub portraits: Vec<String>,
}

/// Kinds of object that load their metadata lazily.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    Track,
    Album,
    Artist,
    Playlist,
}

impl MetadataKind {
    /// The identifier kind segment for this object kind.
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKind::Track => "track",
            MetadataKind::Album => "album",
            MetadataKind::Artist => "artist",
            MetadataKind::Playlist => "playlist",
        }
    }
}

/// Metadata fetched for a lazily loaded object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Metadata {
    Track(TrackRecord),
    Album(AlbumRecord),
    Artist(ArtistRecord),
    Playlist(PlaylistRecord),
}

/// One offset window of a result kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Window {
    pub offset: u32,
    pub limit: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub tracks: Window,
    pub albums: Window,
    pub artists: Window,
    pub playlists: Window,
    pub search_type: SearchType,
}

/// Items fetched for one window plus the total the service reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T> Paged<T> {
    /// Slices `all` down to `window`, keeping the full length as total.
    pub fn window(all: Vec<T>, window: Window) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect();
        Self { items, total }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub did_you_mean: Option<String>,
    pub tracks: Paged<TrackRecord>,
    pub albums: Paged<AlbumRecord>,
    pub artists: Paged<ArtistRecord>,
    pub playlists: Paged<PlaylistRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paged_window() {
        let page = Paged::window((0..17).collect::<Vec<_>>(), Window { offset: 10, limit: 10 });
        assert_eq!(page.items, vec![10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(page.total, 17);
    }

    #[test]
    fn test_paged_window_past_end() {
        let page = Paged::window(vec![1, 2, 3], Window { offset: 5, limit: 2 });
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }
}
