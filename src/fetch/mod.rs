//! # Fetch Worker
//!
//! One network request for one identifier, classified into a [`FetchOutcome`].
//! Workers never retry; a failure is terminal for that identifier in that run.

pub mod credentials;
pub mod http;
pub mod outcome;

use async_trait::async_trait;

pub use credentials::{CredentialSource, DerivedCredential, StaticCredential};
pub use http::{HttpFetcher, HttpFetcherConfig};
pub use outcome::{classify_status, FetchOutcome, StatusClass};

/// Performs a single fetch for one identifier
///
/// Implementations classify every failure into the returned outcome instead of
/// returning an error, so one identifier can never abort a run.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, identifier: &str) -> FetchOutcome;
}
