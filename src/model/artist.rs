//! Artist entity

use crate::binding::{
    from_link, wait_until_loaded, ArtistKind, Handle, Link, LinkCodec, LinkKind, Linkable, Loadable,
};
use crate::error::Result;
use crate::native::{ArtistBrowseType, ErrorCode, ImageSize, NativeLibrary, RawRef};
use crate::session::Session;

use super::{derived_status, ArtistBrowse, Image};

/// An artist. Metadata loads lazily on the native side; there is no
/// completion callback, so waiting polls `is_loaded`.
#[derive(Debug)]
pub struct Artist {
    handle: Handle<ArtistKind>,
    session: Session,
}

impl Artist {
    pub fn new(session: &Session, link: &str) -> Result<Self> {
        from_link::<Artist>(session, link)
    }

    pub(crate) fn adopt(session: &Session, raw: RawRef) -> Self {
        Self {
            session: session.clone(),
            handle: Handle::from_raw(session.native().clone(), raw),
        }
    }

    pub async fn name(&self) -> Result<String> {
        wait_until_loaded(self, None).await?;
        Ok(self.native().artist_name(self.raw()).unwrap_or_default())
    }

    pub fn portrait(&self, size: ImageSize) -> Option<Image> {
        let raw = self.native().artist_portrait(self.raw(), size)?;
        Some(Image::adopt(&self.session, raw))
    }

    pub fn portrait_link(&self, size: ImageSize) -> Option<Link> {
        let uri = self.native().link_create_from_artist_portrait(self.raw(), size)?;
        uri.parse().ok()
    }

    /// Starts an artist browse. The browse loads asynchronously.
    pub fn browse(&self, browse_type: ArtistBrowseType) -> Result<ArtistBrowse> {
        ArtistBrowse::new(&self.session, self.raw(), browse_type)
    }
}

fn artist_from_link(session: &Session, link: &Link) -> Option<Artist> {
    let raw = session.native().link_as_artist(link.as_str())?;
    Some(Artist::adopt(session, raw))
}

impl Linkable for Artist {
    type Decoded = Artist;

    const CODEC: LinkCodec<Artist> = LinkCodec {
        kind: LinkKind::Artist,
        to_link: |native, raw| native.link_create_from_artist(raw),
        from_link: artist_from_link,
    };

    fn raw(&self) -> RawRef {
        self.handle.raw()
    }

    fn native(&self) -> &dyn NativeLibrary {
        self.handle.native().as_ref()
    }
}

impl Loadable for Artist {
    fn is_loaded(&self) -> bool {
        self.native().artist_is_loaded(self.raw())
    }

    fn status(&self) -> ErrorCode {
        derived_status(self.is_loaded(), || self.native().artist_name(self.raw()).is_some())
    }
}
