//! Artist browse entity

use std::time::Duration;

use crate::binding::{
    subscribe_for_callback, wait_until_loaded, ArtistBrowseKind, Collection, Enumerator, Handle,
    LoadSignal, Loadable,
};
use crate::error::{HallonError, Result};
use crate::native::{ArtistBrowseType, ErrorCode, NativeLibrary, RawRef};
use crate::session::Session;

use super::{Album, Artist, Image, Track};

pub type BrowseTracks<'a> = Enumerator<'a, ArtistBrowse, Track>;
pub type BrowseAlbums<'a> = Enumerator<'a, ArtistBrowse, Album>;
pub type BrowsePortraits<'a> = Enumerator<'a, ArtistBrowse, Image>;

/// Everything the service knows about one artist, loaded asynchronously.
#[derive(Debug)]
pub struct ArtistBrowse {
    handle: Handle<ArtistBrowseKind>,
    session: Session,
    signal: LoadSignal,
}

impl ArtistBrowse {
    pub(crate) fn new(session: &Session, artist: RawRef, browse_type: ArtistBrowseType) -> Result<Self> {
        let session_raw = session.raw();
        let (handle, signal) =
            subscribe_for_callback::<ArtistBrowseKind>(session.native(), |native, callback, token| {
                native.artistbrowse_create(session_raw, artist, browse_type, callback, token)
            })?;
        tracing::debug!(%artist, raw = %handle.raw(), ?browse_type, "artist browse dispatched");

        Ok(Self {
            handle,
            session: session.clone(),
            signal,
        })
    }

    fn native(&self) -> &dyn NativeLibrary {
        self.handle.native().as_ref()
    }

    fn raw(&self) -> RawRef {
        self.handle.raw()
    }

    pub async fn load(self, timeout: Option<Duration>) -> Result<Self> {
        wait_until_loaded(&self, timeout).await?;
        Ok(self)
    }

    pub async fn artist(&self) -> Result<Artist> {
        wait_until_loaded(self, None).await?;
        let raw = self
            .native()
            .artistbrowse_artist(self.raw())
            .ok_or_else(|| HallonError::acquisition("artist", "artist browse has no artist"))?;
        Ok(Artist::adopt(&self.session, raw))
    }

    pub async fn biography(&self) -> Result<String> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().artistbrowse_biography(self.raw()))
    }

    pub fn tracks(&self) -> BrowseTracks<'_> {
        Enumerator::new(self, TRACKS)
    }

    pub fn albums(&self) -> BrowseAlbums<'_> {
        Enumerator::new(self, ALBUMS)
    }

    pub fn portraits(&self) -> BrowsePortraits<'_> {
        Enumerator::new(self, PORTRAITS)
    }
}

// A browse reports no separate totals: the fetched lists are complete and
// start at offset 0.
const TRACKS: Collection<ArtistBrowse, Track> = Collection {
    offset: |_| 0,
    size: |b| b.native().artistbrowse_num_tracks(b.raw()),
    total: |b| b.native().artistbrowse_num_tracks(b.raw()),
    item: |b, i| {
        let raw = b.native().artistbrowse_track(b.raw(), i)?;
        Some(Track::adopt(&b.session, raw))
    },
};

const ALBUMS: Collection<ArtistBrowse, Album> = Collection {
    offset: |_| 0,
    size: |b| b.native().artistbrowse_num_albums(b.raw()),
    total: |b| b.native().artistbrowse_num_albums(b.raw()),
    item: |b, i| {
        let raw = b.native().artistbrowse_album(b.raw(), i)?;
        Some(Album::adopt(&b.session, raw))
    },
};

const PORTRAITS: Collection<ArtistBrowse, Image> = Collection {
    offset: |_| 0,
    size: |b| b.native().artistbrowse_num_portraits(b.raw()),
    total: |b| b.native().artistbrowse_num_portraits(b.raw()),
    item: |b, i| {
        let raw = b.native().artistbrowse_portrait(b.raw(), i)?;
        Some(Image::adopt(&b.session, raw))
    },
};

impl Loadable for ArtistBrowse {
    fn is_loaded(&self) -> bool {
        self.native().artistbrowse_is_loaded(self.raw())
    }

    fn status(&self) -> ErrorCode {
        self.native().artistbrowse_error(self.raw())
    }

    fn load_signal(&self) -> Option<&LoadSignal> {
        Some(&self.signal)
    }
}
