//! # Concurrency Coordinator
//!
//! Runs one deduplicated window: cache hits are recorded inline, every miss gets its
//! own tokio task, and the window does not return until all of those tasks finish.
//! That barrier is what bounds in-flight requests to the window size.
//!
//! Tasks share a single [`RunState`] behind one `parking_lot::Mutex`. The lock is
//! taken once per identifier for the in-memory merge and is never held across an
//! `.await`; cache write-through happens after the lock is released.

use futures::future::join_all;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use super::aggregator::RunTally;
use crate::cache::CacheProvider;
use crate::error::FetchError;
use crate::fetch::{FetchOutcome, Fetcher};

/// Everything window tasks mutate, guarded by one lock
#[derive(Debug, Default)]
pub struct RunState {
    /// Final result mapping: identifier -> payload
    pub results: HashMap<String, String>,
    pub tally: RunTally,
}

pub type SharedRunState = Arc<Mutex<RunState>>;

/// How a spawned task's outcome was merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merged {
    Success,
    RateLimited,
    Failed,
}

/// Per-window counters, used for logging and rate-limit backoff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowReport {
    pub index: usize,
    /// Unique identifiers in the window after deduplication
    pub size: usize,
    pub cache_hits: usize,
    /// Tasks spawned for live fetches
    pub fetched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub rate_limited: usize,
    pub duration_ms: u64,
}

#[derive(Clone)]
pub struct WindowCoordinator {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<CacheProvider>,
    cache_ttl: Duration,
    request_timeout: Duration,
}

impl std::fmt::Debug for WindowCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowCoordinator")
            .field("cache", &self.cache.provider_name())
            .field("cache_ttl", &self.cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl WindowCoordinator {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<CacheProvider>,
        cache_ttl: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            cache,
            cache_ttl,
            request_timeout,
        }
    }

    /// Process one window of already-deduplicated identifiers.
    pub async fn process_window(
        &self,
        index: usize,
        ids: &[String],
        state: &SharedRunState,
    ) -> WindowReport {
        let started = Instant::now();
        let mut report = WindowReport {
            index,
            size: ids.len(),
            ..WindowReport::default()
        };

        let mut spawned = Vec::with_capacity(ids.len());
        let mut handles = Vec::with_capacity(ids.len());

        for identifier in ids {
            if let Some(cached) = self.lookup(identifier).await {
                let mut guard = state.lock();
                guard.results.insert(identifier.clone(), cached);
                guard.tally.record_cache_hit();
                report.cache_hits += 1;
                continue;
            }

            let task = self.clone();
            let task_state = Arc::clone(state);
            let task_identifier = identifier.clone();
            handles.push(tokio::spawn(async move {
                task.fetch_and_merge(&task_identifier, &task_state).await
            }));
            spawned.push(identifier.clone());
        }

        report.fetched = handles.len();

        // Window barrier
        let joined = join_all(handles).await;

        for (identifier, result) in spawned.iter().zip(joined) {
            match result {
                Ok(Merged::Success) => report.succeeded += 1,
                Ok(Merged::RateLimited) => {
                    report.rate_limited += 1;
                    report.failed += 1;
                }
                Ok(Merged::Failed) => report.failed += 1,
                Err(join_error) => {
                    error!(
                        window = index,
                        identifier = %identifier,
                        error = %join_error,
                        "Fetch task did not complete"
                    );
                    // A task only dies after merging if it was on the success path
                    let mut guard = state.lock();
                    if guard.results.contains_key(identifier) {
                        report.succeeded += 1;
                    } else {
                        guard.tally.record_failure(identifier, false);
                        report.failed += 1;
                    }
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }

    /// Cache lookup; backend errors degrade to a miss
    async fn lookup(&self, identifier: &str) -> Option<String> {
        match self.cache.get(identifier).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(
                    identifier = identifier,
                    error = %e,
                    "Cache lookup failed, fetching live"
                );
                None
            }
        }
    }

    async fn fetch_and_merge(&self, identifier: &str, state: &SharedRunState) -> Merged {
        let outcome = self.fetch_bounded(identifier).await;

        debug!(
            identifier = identifier,
            outcome = outcome.label(),
            "Fetch completed"
        );

        let merged = {
            let mut guard = state.lock();
            match &outcome {
                FetchOutcome::Success(payload) => {
                    guard
                        .results
                        .insert(identifier.to_string(), payload.clone());
                    guard.tally.record_success(identifier);
                    Merged::Success
                }
                FetchOutcome::RateLimited => {
                    guard.tally.record_failure(identifier, true);
                    Merged::RateLimited
                }
                FetchOutcome::Failed(_) => {
                    guard.tally.record_failure(identifier, false);
                    Merged::Failed
                }
            }
        };

        match outcome {
            FetchOutcome::Success(payload) => {
                if let Err(e) = self.cache.set(identifier, &payload, self.cache_ttl).await {
                    warn!(
                        identifier = identifier,
                        error = %e,
                        "Cache write-through failed, result kept"
                    );
                }
            }
            FetchOutcome::RateLimited => {
                warn!(identifier = identifier, "Rate limited by remote resource");
            }
            FetchOutcome::Failed(e) => {
                warn!(
                    identifier = identifier,
                    kind = e.kind(),
                    error = %e,
                    "Fetch failed"
                );
            }
        }

        merged
    }

    /// Run the fetcher under the per-request timeout, converting panics to failures
    async fn fetch_bounded(&self, identifier: &str) -> FetchOutcome {
        let fetch = AssertUnwindSafe(self.fetcher.fetch(identifier)).catch_unwind();
        match tokio::time::timeout(self.request_timeout, fetch).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(panic)) => FetchOutcome::Failed(FetchError::Panicked(panic_message(&panic))),
            Err(_) => FetchOutcome::Failed(FetchError::Timeout(self.request_timeout)),
        }
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
