//! Error types for the batch fetch engine.
//!
//! Two layers exist. [`FetchError`] describes why a single identifier could not be
//! fetched; it is always recovered locally and recorded in the run metadata.
//! [`BatchFetchError`] is reserved for failures that stop a whole run before or
//! after the engine executes (bad configuration, unreadable source, sink I/O).

use std::time::Duration;
use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigurationError;

/// Why a single fetch attempt did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS, connect, TLS or any other transport-level failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// The request did not complete within the per-request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Non-2xx status other than 429
    #[error("Unexpected status: {status}")]
    UnexpectedStatus { status: u16 },
    /// The status was 2xx but the body could not be read
    #[error("Failed to read response body: {0}")]
    BodyRead(String),
    /// The fetcher panicked while handling the identifier
    #[error("Fetch task panicked: {0}")]
    Panicked(String),
}

impl FetchError {
    /// Short, stable label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Timeout(_) => "timeout",
            FetchError::UnexpectedStatus { .. } => "unexpected_status",
            FetchError::BodyRead(_) => "body_read",
            FetchError::Panicked(_) => "panicked",
        }
    }
}

/// Run-level failures.
#[derive(Debug, Error)]
pub enum BatchFetchError {
    #[error("Identifier source {0} contains no identifiers")]
    EmptySource(String),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BatchFetchError>;
