//! Fetch outcome classification

use crate::constants::RATE_LIMITED_STATUS;
use crate::error::FetchError;

/// Classified result of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx with the full response body
    Success(String),
    /// 429; counted both as a rate-limit hit and as a failure
    RateLimited,
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchOutcome::RateLimited)
    }

    /// Short label for structured logs
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Success(_) => "success",
            FetchOutcome::RateLimited => "rate_limited",
            FetchOutcome::Failed(e) => e.kind(),
        }
    }
}

/// What an HTTP status means before the body is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    RateLimited,
    Unexpected,
}

pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        RATE_LIMITED_STATUS => StatusClass::RateLimited,
        _ => StatusClass::Unexpected,
    }
}
