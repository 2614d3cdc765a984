//! The native session every entity is created against

use std::sync::Arc;

use crate::binding::{Handle, SessionKind};
use crate::error::Result;
use crate::native::{NativeLibrary, RawRef};

/// Shared owner of the native library and its session handle.
///
/// Entities keep a clone, so the session outlives every handle made from it.
#[derive(Clone, Debug)]
pub struct Session {
    handle: Arc<Handle<SessionKind>>,
}

impl Session {
    pub fn new(native: Arc<dyn NativeLibrary>) -> Result<Self> {
        let handle = Handle::acquire(&native, |native| native.session_create())?;
        tracing::info!(raw = %handle.raw(), "native session created");
        Ok(Self {
            handle: Arc::new(handle),
        })
    }

    pub fn native(&self) -> &Arc<dyn NativeLibrary> {
        self.handle.native()
    }

    pub(crate) fn raw(&self) -> RawRef {
        self.handle.raw()
    }
}
