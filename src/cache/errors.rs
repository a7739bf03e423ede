//! Cache gateway errors. A miss is `Ok(None)`, never one of these.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached when the gateway was built
    #[error("Cache at {endpoint} is unavailable: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// A lookup or write did not finish within the operation timeout
    #[error("Cache {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The backend answered with an error
    #[error("Cache {operation} failed: {reason}")]
    Backend {
        operation: &'static str,
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn backend(operation: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Backend {
            operation,
            reason: reason.to_string(),
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
