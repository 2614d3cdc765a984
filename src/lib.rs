//! hallon: safe bindings over a native media-service library
//!
//! The [`native`] module describes the library's ABI and ships an engine that
//! implements it. The [`binding`] module holds the reusable patterns (handles,
//! identifiers, load state, completion callbacks, paginated collections) and
//! [`model`] composes them into entities. [`controller`] and [`view`] make up
//! a small axum front-end over artist search.

pub mod auth;
pub mod binding;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod native;
pub mod session;
pub mod view;

pub use binding::{Enumerator, Link, LinkKind, LoadState, Loadable, Linkable};
pub use error::{HallonError, Result};
pub use model::{
    Album, Artist, ArtistBrowse, Image, Playlist, ResultKind, Search, SearchParameters, Track,
    DEFAULT_SEARCH_PARAMETERS,
};
pub use session::Session;
