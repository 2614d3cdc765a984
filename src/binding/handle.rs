//! Exclusive ownership of native references

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{HallonError, Result};
use crate::native::{NativeLibrary, RawRef};

/// One kind of native object and the function that releases it.
pub trait NativeKind: 'static {
    const NAME: &'static str;

    fn release(native: &dyn NativeLibrary, raw: RawRef);
}

macro_rules! native_kinds {
    ($($kind:ident => $name:literal, $release:ident;)*) => {
        $(
            #[derive(Debug)]
            pub enum $kind {}

            impl NativeKind for $kind {
                const NAME: &'static str = $name;

                fn release(native: &dyn NativeLibrary, raw: RawRef) {
                    native.$release(raw);
                }
            }
        )*
    };
}

native_kinds! {
    SessionKind => "session", session_release;
    SearchKind => "search", search_release;
    ArtistKind => "artist", artist_release;
    TrackKind => "track", track_release;
    AlbumKind => "album", album_release;
    PlaylistKind => "playlist", playlist_release;
    ImageKind => "image", image_release;
    ArtistBrowseKind => "artistbrowse", artistbrowse_release;
}

/// An owned native reference, released exactly once on drop.
///
/// Not `Clone`: two entities never share one count. An accessor that hands
/// out the same native object again returns a new owned reference.
pub struct Handle<K: NativeKind> {
    raw: RawRef,
    native: Arc<dyn NativeLibrary>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: NativeKind> Handle<K> {
    /// Runs the native creation call and takes ownership of its result.
    /// Nothing is released when the call produces no reference.
    pub fn acquire(
        native: &Arc<dyn NativeLibrary>,
        factory: impl FnOnce(&dyn NativeLibrary) -> Option<RawRef>,
    ) -> Result<Self> {
        match factory(native.as_ref()) {
            Some(raw) => Ok(Self::from_raw(Arc::clone(native), raw)),
            None => Err(HallonError::acquisition(K::NAME, "native creation call returned no reference")),
        }
    }

    /// Adopts a reference the caller already owns.
    pub fn from_raw(native: Arc<dyn NativeLibrary>, raw: RawRef) -> Self {
        Self {
            raw,
            native,
            _kind: PhantomData,
        }
    }

    pub fn raw(&self) -> RawRef {
        self.raw
    }

    pub fn native(&self) -> &Arc<dyn NativeLibrary> {
        &self.native
    }
}

impl<K: NativeKind> Drop for Handle<K> {
    fn drop(&mut self) {
        tracing::trace!(kind = K::NAME, raw = %self.raw, "releasing native reference");
        K::release(self.native.as_ref(), self.raw);
    }
}

impl<K: NativeKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &K::NAME)
            .field("raw", &self.raw)
            .finish()
    }
}
