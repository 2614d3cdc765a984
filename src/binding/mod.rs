//! Binding core - lifecycle patterns every entity reuses
//!
//! - `handle`: exclusive ownership of one native reference
//! - `link`: canonical identifiers and per-kind link codecs
//! - `loadable`: load state and waiting for it
//! - `observable`: bridging native completion callbacks to waiters
//! - `enumerator`: lazy, offset-paginated views over native collections

pub mod enumerator;
pub mod handle;
pub mod link;
pub mod loadable;
pub mod observable;

pub use enumerator::{Collection, Enumerator, Iter};
pub use handle::{
    AlbumKind, ArtistBrowseKind, ArtistKind, Handle, ImageKind, NativeKind, PlaylistKind,
    SearchKind, SessionKind, TrackKind,
};
pub use link::{from_link, to_link, Link, LinkCodec, LinkKind, Linkable};
pub use loadable::{wait_until_loaded, LoadState, Loadable};
pub use observable::{subscribe_for_callback, LoadSignal};
