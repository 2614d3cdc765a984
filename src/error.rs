//! Error type of the binding layer

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HallonError {
    /// The native library returned a null reference.
    #[error("failed to acquire {kind}: {context}")]
    Acquisition { kind: &'static str, context: String },

    #[error("`{input}` is not a valid {expected} identifier")]
    InvalidIdentifier { input: String, expected: &'static str },

    #[error("timed out after {0:?} waiting for the object to load")]
    Timeout(Duration),

    #[error("index {index} is out of range for a collection of {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("loading failed: {0}")]
    LoadFailed(String),
}

impl HallonError {
    pub(crate) fn acquisition(kind: &'static str, context: impl Into<String>) -> Self {
        HallonError::Acquisition {
            kind,
            context: context.into(),
        }
    }
}

pub type Result<T, E = HallonError> = std::result::Result<T, E>;
