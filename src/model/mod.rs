//! Model module - entities exposed by the binding
//!
//! Each entity owns one native handle and composes the binding patterns:
//!
//! - `types`: search parameters and result kinds
//! - `search`: async search with eight paginated collections
//! - `artist`: lazily loaded artist, portraits and browsing
//! - `artist_browse`: async artist browse
//! - `track`: tracks and albums
//! - `playlist`: playlists and images

mod types;
mod search;
mod artist;
mod artist_browse;
mod track;
mod playlist;

use crate::native::ErrorCode;

pub use types::{ResultKind, SearchParameters, DEFAULT_SEARCH_PARAMETERS};

pub use search::{
    Search, SearchAlbums, SearchArtists, SearchPlaylistImageUris, SearchPlaylistImages,
    SearchPlaylistNames, SearchPlaylistUris, SearchPlaylists, SearchTracks,
};

pub use artist::Artist;

pub use artist_browse::{ArtistBrowse, BrowseAlbums, BrowsePortraits, BrowseTracks};

pub use track::{Album, Track};

pub use playlist::{Image, Playlist};

/// Status for kinds without a native error query: still loading, loaded
/// with data, or loaded empty (the native fetch failed).
fn derived_status(loaded: bool, populated: impl FnOnce() -> bool) -> ErrorCode {
    if !loaded {
        ErrorCode::IsLoading
    } else if populated() {
        ErrorCode::Ok
    } else {
        ErrorCode::OtherPermanent
    }
}
