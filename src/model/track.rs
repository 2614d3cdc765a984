//! Track and album entities

use std::time::Duration;

use crate::binding::{
    from_link, wait_until_loaded, AlbumKind, Handle, Link, LinkCodec, LinkKind, Linkable, Loadable,
    TrackKind,
};
use crate::error::Result;
use crate::native::{ErrorCode, NativeLibrary, RawRef};
use crate::session::Session;

use super::{derived_status, Artist};

#[derive(Debug)]
pub struct Track {
    handle: Handle<TrackKind>,
    session: Session,
}

impl Track {
    pub fn new(session: &Session, link: &str) -> Result<Self> {
        from_link::<Track>(session, link)
    }

    pub(crate) fn adopt(session: &Session, raw: RawRef) -> Self {
        Self {
            session: session.clone(),
            handle: Handle::from_raw(session.native().clone(), raw),
        }
    }

    pub async fn name(&self) -> Result<String> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().track_name(self.raw()).unwrap_or_default())
    }

    pub async fn duration(&self) -> Result<Duration> {
        wait_until_loaded(self, None).await?;
        let millis = self.native().track_duration(self.raw());
        Ok(Duration::from_millis(u64::from(millis)))
    }

    /// `None` until the track has loaded, or when it has no album.
    pub fn album(&self) -> Option<Album> {
        let raw = self.native().track_album(self.raw())?;
        Some(Album::adopt(&self.session, raw))
    }
}

fn track_from_link(session: &Session, link: &Link) -> Option<Track> {
    let raw = session.native().link_as_track(link.as_str())?;
    Some(Track::adopt(session, raw))
}

impl Linkable for Track {
    type Decoded = Track;

    const CODEC: LinkCodec<Track> = LinkCodec {
        kind: LinkKind::Track,
        to_link: |native, raw| native.link_create_from_track(raw),
        from_link: track_from_link,
    };

    fn raw(&self) -> RawRef {
        self.handle.raw()
    }

    fn native(&self) -> &dyn NativeLibrary {
        self.handle.native().as_ref()
    }
}

impl Loadable for Track {
    fn is_loaded(&self) -> bool {
        self.native().track_is_loaded(self.raw())
    }

    fn status(&self) -> ErrorCode {
        self.native().track_error(self.raw())
    }
}

#[derive(Debug)]
pub struct Album {
    handle: Handle<AlbumKind>,
    session: Session,
}

impl Album {
    pub fn new(session: &Session, link: &str) -> Result<Self> {
        from_link::<Album>(session, link)
    }

    pub(crate) fn adopt(session: &Session, raw: RawRef) -> Self {
        Self {
            session: session.clone(),
            handle: Handle::from_raw(session.native().clone(), raw),
        }
    }

    pub async fn name(&self) -> Result<String> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().album_name(self.raw()).unwrap_or_default())
    }

    pub async fn year(&self) -> Result<Option<i32>> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().album_year(self.raw()))
    }

    /// `None` until the album has loaded, or when it has no artist.
    pub fn artist(&self) -> Option<Artist> {
        let raw = self.native().album_artist(self.raw())?;
        Some(Artist::adopt(&self.session, raw))
    }
}

fn album_from_link(session: &Session, link: &Link) -> Option<Album> {
    let raw = session.native().link_as_album(link.as_str())?;
    Some(Album::adopt(session, raw))
}

impl Linkable for Album {
    type Decoded = Album;

    const CODEC: LinkCodec<Album> = LinkCodec {
        kind: LinkKind::Album,
        to_link: |native, raw| native.link_create_from_album(raw),
        from_link: album_from_link,
    };

    fn raw(&self) -> RawRef {
        self.handle.raw()
    }

    fn native(&self) -> &dyn NativeLibrary {
        self.handle.native().as_ref()
    }
}

impl Loadable for Album {
    fn is_loaded(&self) -> bool {
        self.native().album_is_loaded(self.raw())
    }

    fn status(&self) -> ErrorCode {
        derived_status(self.is_loaded(), || self.native().album_name(self.raw()).is_some())
    }
}
