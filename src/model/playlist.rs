//! Playlist and image entities
//!
//! Both are created from identifiers and load lazily on the native side.

use crate::binding::{
    from_link, wait_until_loaded, Handle, ImageKind, Link, LinkCodec, LinkKind, Linkable, Loadable,
    PlaylistKind,
};
use crate::error::Result;
use crate::native::{ErrorCode, NativeLibrary, RawRef};
use crate::session::Session;

use super::derived_status;

#[derive(Debug)]
pub struct Playlist {
    handle: Handle<PlaylistKind>,
    _session: Session,
}

impl Playlist {
    pub fn new(session: &Session, link: &str) -> Result<Self> {
        from_link::<Playlist>(session, link)
    }

    /// Creates the playlist named by a URI the native side produced.
    pub(crate) fn from_uri(session: &Session, uri: &str) -> Option<Self> {
        let raw = session.native().playlist_create(session.raw(), uri)?;
        Some(Self {
            _session: session.clone(),
            handle: Handle::from_raw(session.native().clone(), raw),
        })
    }

    pub async fn name(&self) -> Result<String> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().playlist_name(self.raw()).unwrap_or_default())
    }

    /// Display name (or user id) of the playlist's owner.
    pub async fn owner(&self) -> Result<String> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().playlist_owner(self.raw()).unwrap_or_default())
    }
}

fn playlist_from_link(session: &Session, link: &Link) -> Option<Playlist> {
    Playlist::from_uri(session, link.as_str())
}

impl Linkable for Playlist {
    type Decoded = Playlist;

    const CODEC: LinkCodec<Playlist> = LinkCodec {
        kind: LinkKind::Playlist,
        to_link: |native, raw| native.link_create_from_playlist(raw),
        from_link: playlist_from_link,
    };

    fn raw(&self) -> RawRef {
        self.handle.raw()
    }

    fn native(&self) -> &dyn NativeLibrary {
        self.handle.native().as_ref()
    }
}

impl Loadable for Playlist {
    fn is_loaded(&self) -> bool {
        self.native().playlist_is_loaded(self.raw())
    }

    fn status(&self) -> ErrorCode {
        derived_status(self.is_loaded(), || self.native().playlist_name(self.raw()).is_some())
    }
}

#[derive(Debug)]
pub struct Image {
    handle: Handle<ImageKind>,
    _session: Session,
}

impl Image {
    pub fn new(session: &Session, link: &str) -> Result<Self> {
        from_link::<Image>(session, link)
    }

    pub(crate) fn adopt(session: &Session, raw: RawRef) -> Self {
        Self {
            _session: session.clone(),
            handle: Handle::from_raw(session.native().clone(), raw),
        }
    }

    pub(crate) fn from_uri(session: &Session, uri: &str) -> Option<Self> {
        let raw = session.native().image_create_from_link(session.raw(), uri)?;
        Some(Self::adopt(session, raw))
    }
}

fn image_from_link(session: &Session, link: &Link) -> Option<Image> {
    Image::from_uri(session, link.as_str())
}

impl Linkable for Image {
    type Decoded = Image;

    const CODEC: LinkCodec<Image> = LinkCodec {
        kind: LinkKind::Image,
        to_link: |native, raw| native.link_create_from_image(raw),
        from_link: image_from_link,
    };

    fn raw(&self) -> RawRef {
        self.handle.raw()
    }

    fn native(&self) -> &dyn NativeLibrary {
        self.handle.native().as_ref()
    }
}

impl Loadable for Image {
    fn is_loaded(&self) -> bool {
        self.native().image_is_loaded(self.raw())
    }

    fn status(&self) -> ErrorCode {
        derived_status(self.is_loaded(), || true)
    }
}
