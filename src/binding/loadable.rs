//! Load state and waiting for it

use std::time::Duration;

use super::observable::LoadSignal;
use crate::error::{HallonError, Result};
use crate::native::ErrorCode;

/// Polling period for entities the native side loads lazily.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed(_))
    }
}

/// An entity whose native data arrives some time after construction.
pub trait Loadable {
    fn is_loaded(&self) -> bool;

    /// The native status, reported verbatim.
    fn status(&self) -> ErrorCode;

    /// Completion signal for entities created by a native async call.
    fn load_signal(&self) -> Option<&LoadSignal> {
        None
    }

    fn load_state(&self) -> LoadState {
        match self.load_signal() {
            Some(signal) => signal.state(),
            None if self.is_loaded() => LoadState::Loaded,
            None => LoadState::Loading,
        }
    }
}

/// Waits until `entity` reaches a terminal state.
///
/// A timeout only stops this wait; the native request keeps running and the
/// entity stays `Loading`.
pub async fn wait_until_loaded<L>(entity: &L, timeout: Option<Duration>) -> Result<()>
where
    L: Loadable + ?Sized,
{
    let wait = async {
        match entity.load_signal() {
            Some(signal) => signal.wait().await,
            None => {
                while !entity.is_loaded() {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Ok(())
            }
        }
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| HallonError::Timeout(limit))?,
        None => wait.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Loads after a fixed number of polls.
    struct Lazy {
        polls: AtomicUsize,
        after: usize,
    }

    impl Loadable for Lazy {
        fn is_loaded(&self) -> bool {
            self.polls.fetch_add(1, Ordering::SeqCst) >= self.after
        }

        fn status(&self) -> ErrorCode {
            ErrorCode::Ok
        }
    }

    #[tokio::test]
    async fn test_polls_until_loaded() {
        let entity = Lazy { polls: AtomicUsize::new(0), after: 3 };
        wait_until_loaded(&entity, Some(Duration::from_secs(5))).await.unwrap();
        assert!(entity.polls.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_times_out() {
        let entity = Lazy { polls: AtomicUsize::new(0), after: usize::MAX };
        let limit = Duration::from_millis(30);
        let result = wait_until_loaded(&entity, Some(limit)).await;
        assert_eq!(result, Err(HallonError::Timeout(limit)));
        assert_eq!(entity.load_state(), LoadState::Loading);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!LoadState::Unloaded.is_terminal());
        assert!(!LoadState::Loading.is_terminal());
        assert!(LoadState::Loaded.is_terminal());
        assert!(LoadState::Failed("x".into()).is_terminal());
    }
}
