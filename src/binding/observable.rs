//! Completion subscriptions
//!
//! Native async calls complete on the native processing thread by invoking a
//! plain function pointer with the token they were given. The process-wide
//! dispatcher maps that token back to the entity's load state and wakes the
//! tasks waiting on it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::handle::{Handle, NativeKind};
use super::loadable::LoadState;
use crate::error::{HallonError, Result};
use crate::native::{CallbackToken, CompletionCallback, NativeLibrary, RawRef};

struct Registration {
    /// The reference the creation call returned, once known.
    raw: Option<RawRef>,
    state: Arc<watch::Sender<LoadState>>,
}

#[derive(Default)]
struct Dispatcher {
    next_token: AtomicU64,
    pending: Mutex<HashMap<CallbackToken, Registration>>,
}

static DISPATCHER: LazyLock<Dispatcher> = LazyLock::new(Dispatcher::default);

impl Dispatcher {
    fn pending(&self) -> MutexGuard<'_, HashMap<CallbackToken, Registration>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self) -> (CallbackToken, Arc<watch::Sender<LoadState>>) {
        let token = CallbackToken::from_raw(self.next_token.fetch_add(1, Ordering::Relaxed) + 1);
        let (state, _) = watch::channel(LoadState::Unloaded);
        let state = Arc::new(state);
        self.pending().insert(
            token,
            Registration {
                raw: None,
                state: Arc::clone(&state),
            },
        );
        (token, state)
    }

    fn associate(&self, token: CallbackToken, raw: RawRef) {
        if let Some(registration) = self.pending().get_mut(&token) {
            registration.raw = Some(raw);
        }
    }

    fn forget(&self, token: CallbackToken) -> bool {
        self.pending().remove(&token).is_some()
    }

    fn resolve(&self, raw: Option<RawRef>, token: CallbackToken) {
        // Removal under the lock makes this the only resolver of the token.
        let Some(registration) = self.pending().remove(&token) else {
            tracing::debug!(token = token.get(), "completion for unknown or resolved registration ignored");
            return;
        };

        let next = match (raw, registration.raw) {
            (Some(raw), Some(expected)) if raw != expected => {
                LoadState::Failed(format!("completion delivered {} for request {}", raw, expected))
            }
            (Some(_), _) => LoadState::Loaded,
            (None, _) => LoadState::Failed("native library abandoned the request".to_string()),
        };
        tracing::debug!(token = token.get(), state = ?next, "completion resolved");

        registration.state.send_if_modified(|current| {
            if *current == LoadState::Loading {
                *current = next;
                true
            } else {
                false
            }
        });
    }
}

/// The callback handed to every native async creation call.
fn dispatch_completion(raw: Option<RawRef>, token: CallbackToken) {
    DISPATCHER.resolve(raw, token);
}

#[cfg(test)]
pub(crate) fn is_pending(token: CallbackToken) -> bool {
    DISPATCHER.pending().contains_key(&token)
}

/// The load state of one async entity, published by its completion.
///
/// Dropping the signal before the completion arrives forgets the
/// registration; the late completion is then ignored.
#[derive(Debug)]
pub struct LoadSignal {
    state: Arc<watch::Sender<LoadState>>,
    token: Option<CallbackToken>,
}

impl LoadSignal {
    fn register() -> Self {
        let (token, state) = DISPATCHER.register();
        Self {
            state,
            token: Some(token),
        }
    }

    /// A signal that is already loaded, for entities adopted from
    /// references that completed elsewhere.
    pub fn ready() -> Self {
        let (state, _) = watch::channel(LoadState::Loaded);
        Self {
            state: Arc::new(state),
            token: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    #[cfg(test)]
    fn token(&self) -> Option<CallbackToken> {
        self.token
    }

    /// Waits for a terminal state. `Failed` becomes [`HallonError::LoadFailed`].
    pub async fn wait(&self) -> Result<()> {
        let mut receiver = self.state.subscribe();
        let state = match receiver.wait_for(LoadState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => return Err(HallonError::LoadFailed("completion signal closed".to_string())),
        };
        match state {
            LoadState::Failed(reason) => Err(HallonError::LoadFailed(reason)),
            _ => Ok(()),
        }
    }
}

impl Drop for LoadSignal {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            if DISPATCHER.forget(token) {
                tracing::debug!(token = token.get(), "dropped before completion, registration forgotten");
            }
        }
    }
}

/// Registers a completion, then runs `create` with the callback and token.
///
/// The token exists before the native call, so a completion that fires
/// before `create` returns still finds its registration. A creation call
/// that returns no reference leaves no registration behind.
pub fn subscribe_for_callback<K: NativeKind>(
    native: &Arc<dyn NativeLibrary>,
    create: impl FnOnce(&dyn NativeLibrary, CompletionCallback, CallbackToken) -> Option<RawRef>,
) -> Result<(Handle<K>, LoadSignal)> {
    let signal = LoadSignal::register();
    let Some(token) = signal.token else {
        return Err(HallonError::acquisition(K::NAME, "no callback token"));
    };

    signal.state.send_replace(LoadState::Loading);
    let Some(raw) = create(native.as_ref(), dispatch_completion, token) else {
        return Err(HallonError::acquisition(
            K::NAME,
            "native creation call returned no reference",
        ));
    };
    DISPATCHER.associate(token, raw);
    tracing::debug!(kind = K::NAME, %raw, token = token.get(), "subscribed for completion");

    Ok((Handle::from_raw(Arc::clone(native), raw), signal))
}
