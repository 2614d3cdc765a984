//! Search entity

use std::time::Duration;

use crate::binding::link::unescape_query;
use crate::binding::{
    from_link, subscribe_for_callback, wait_until_loaded, Collection, Enumerator, Handle, Link,
    LinkCodec, LinkKind, Linkable, LoadSignal, Loadable, SearchKind,
};
use crate::error::Result;
use crate::native::{ErrorCode, NativeLibrary, RawRef};
use crate::session::Session;

use super::types::{ResultKind, SearchParameters, DEFAULT_SEARCH_PARAMETERS};
use super::{Album, Artist, Image, Playlist, Track};

pub type SearchTracks<'a> = Enumerator<'a, Search, Track>;
pub type SearchAlbums<'a> = Enumerator<'a, Search, Album>;
pub type SearchArtists<'a> = Enumerator<'a, Search, Artist>;
pub type SearchPlaylistNames<'a> = Enumerator<'a, Search, String>;
pub type SearchPlaylistUris<'a> = Enumerator<'a, Search, String>;
pub type SearchPlaylistImageUris<'a> = Enumerator<'a, Search, String>;
pub type SearchPlaylists<'a> = Enumerator<'a, Search, Playlist>;
pub type SearchPlaylistImages<'a> = Enumerator<'a, Search, Image>;

#[derive(Debug)]
pub struct Search {
    handle: Handle<SearchKind>,
    session: Session,
    signal: Option<LoadSignal>,
    parameters: SearchParameters,
}

impl Search {
    /// Dispatches a native search. `query` is either a literal query or a
    /// search identifier, which is decoded first.
    pub fn new(session: &Session, query: &str, parameters: SearchParameters) -> Result<Self> {
        let query = if Link::is_valid(query) {
            from_link::<Search>(session, query)?
        } else {
            query.to_string()
        };

        let [tracks_offset, tracks, albums_offset, albums, artists_offset, artists, playlists_offset, playlists] =
            parameters.positional();
        let session_raw = session.raw();
        let (handle, signal) =
            subscribe_for_callback::<SearchKind>(session.native(), |native, callback, token| {
                native.search_create(
                    session_raw,
                    &query,
                    tracks_offset,
                    tracks,
                    albums_offset,
                    albums,
                    artists_offset,
                    artists,
                    playlists_offset,
                    playlists,
                    parameters.search_type,
                    callback,
                    token,
                )
            })?;
        tracing::debug!(query, raw = %handle.raw(), ?parameters, "search dispatched");

        Ok(Self {
            session: session.clone(),
            handle,
            signal: Some(signal),
            parameters,
        })
    }

    /// Wraps a search reference the caller owns, without dispatching.
    /// Its windows are taken to start at offset 0.
    pub fn adopt(session: &Session, raw: RawRef) -> Self {
        let handle = Handle::from_raw(session.native().clone(), raw);
        let signal = handle
            .native()
            .search_is_loaded(raw)
            .then(LoadSignal::ready);
        Self {
            session: session.clone(),
            handle,
            signal,
            parameters: DEFAULT_SEARCH_PARAMETERS,
        }
    }

    /// The parameters this search was dispatched with. Start the next
    /// window from these with [`SearchParameters::with_offset`].
    pub fn parameters(&self) -> SearchParameters {
        self.parameters
    }

    /// Waits for the search to load, giving up after `timeout`.
    pub async fn load(self, timeout: Option<Duration>) -> Result<Self> {
        wait_until_loaded(&self, timeout).await?;
        Ok(self)
    }

    pub async fn query(&self) -> Result<String> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().search_query(self.raw()))
    }

    pub async fn did_you_mean(&self) -> Result<String> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().search_did_you_mean(self.raw()))
    }

    pub fn tracks(&self) -> SearchTracks<'_> {
        Enumerator::new(self, TRACKS)
    }

    pub fn albums(&self) -> SearchAlbums<'_> {
        Enumerator::new(self, ALBUMS)
    }

    pub fn artists(&self) -> SearchArtists<'_> {
        Enumerator::new(self, ARTISTS)
    }

    pub fn playlist_names(&self) -> SearchPlaylistNames<'_> {
        Enumerator::new(self, PLAYLIST_NAMES)
    }

    pub fn playlist_uris(&self) -> SearchPlaylistUris<'_> {
        Enumerator::new(self, PLAYLIST_URIS)
    }

    pub fn playlist_image_uris(&self) -> SearchPlaylistImageUris<'_> {
        Enumerator::new(self, PLAYLIST_IMAGE_URIS)
    }

    pub fn playlists(&self) -> SearchPlaylists<'_> {
        Enumerator::new(self, PLAYLISTS)
    }

    pub fn playlist_images(&self) -> SearchPlaylistImages<'_> {
        Enumerator::new(self, PLAYLIST_IMAGES)
    }
}

const TRACKS: Collection<Search, Track> = Collection {
    offset: |s| s.parameters.offset(ResultKind::Tracks) as usize,
    size: |s| s.native().search_num_tracks(s.raw()),
    total: |s| s.native().search_total_tracks(s.raw()),
    item: |s, i| {
        let raw = s.native().search_track(s.raw(), i)?;
        Some(Track::adopt(&s.session, raw))
    },
};

const ALBUMS: Collection<Search, Album> = Collection {
    offset: |s| s.parameters.offset(ResultKind::Albums) as usize,
    size: |s| s.native().search_num_albums(s.raw()),
    total: |s| s.native().search_total_albums(s.raw()),
    item: |s, i| {
        let raw = s.native().search_album(s.raw(), i)?;
        Some(Album::adopt(&s.session, raw))
    },
};

const ARTISTS: Collection<Search, Artist> = Collection {
    offset: |s| s.parameters.offset(ResultKind::Artists) as usize,
    size: |s| s.native().search_num_artists(s.raw()),
    total: |s| s.native().search_total_artists(s.raw()),
    item: |s, i| {
        let raw = s.native().search_artist(s.raw(), i)?;
        Some(Artist::adopt(&s.session, raw))
    },
};

const PLAYLIST_NAMES: Collection<Search, String> = Collection {
    offset: |s| s.parameters.offset(ResultKind::Playlists) as usize,
    size: |s| s.native().search_num_playlists(s.raw()),
    total: |s| s.native().search_total_playlists(s.raw()),
    item: |s, i| s.native().search_playlist_name(s.raw(), i),
};

const PLAYLIST_URIS: Collection<Search, String> = Collection {
    item: |s, i| s.native().search_playlist_uri(s.raw(), i),
    ..PLAYLIST_NAMES
};

const PLAYLIST_IMAGE_URIS: Collection<Search, String> = Collection {
    item: |s, i| s.native().search_playlist_image_uri(s.raw(), i),
    ..PLAYLIST_NAMES
};

const PLAYLISTS: Collection<Search, Playlist> = Collection {
    offset: PLAYLIST_NAMES.offset,
    size: PLAYLIST_NAMES.size,
    total: PLAYLIST_NAMES.total,
    item: |s, i| {
        let uri = s.native().search_playlist_uri(s.raw(), i)?;
        Playlist::from_uri(&s.session, &uri)
    },
};

const PLAYLIST_IMAGES: Collection<Search, Image> = Collection {
    offset: PLAYLIST_NAMES.offset,
    size: PLAYLIST_NAMES.size,
    total: PLAYLIST_NAMES.total,
    item: |s, i| {
        let uri = s.native().search_playlist_image_uri(s.raw(), i)?;
        Image::from_uri(&s.session, &uri)
    },
};

fn decode_search_link(_session: &Session, link: &Link) -> Option<String> {
    Some(unescape_query(link.payload()))
}

impl Linkable for Search {
    type Decoded = String;

    const CODEC: LinkCodec<String> = LinkCodec {
        kind: LinkKind::Search,
        to_link: |native, raw| native.link_create_from_search(raw),
        from_link: decode_search_link,
    };

    fn raw(&self) -> RawRef {
        self.handle.raw()
    }

    fn native(&self) -> &dyn NativeLibrary {
        self.handle.native().as_ref()
    }
}

impl Loadable for Search {
    fn is_loaded(&self) -> bool {
        self.native().search_is_loaded(self.raw())
    }

    fn status(&self) -> ErrorCode {
        self.native().search_error(self.raw())
    }

    fn load_signal(&self) -> Option<&LoadSignal> {
        self.signal.as_ref()
    }
}
