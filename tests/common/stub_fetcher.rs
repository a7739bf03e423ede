use async_trait::async_trait;
use batchfetch_core::error::FetchError;
use batchfetch_core::fetch::{FetchOutcome, Fetcher};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How the stub answers a given identifier
#[derive(Debug, Clone)]
pub enum StubBehavior {
    RateLimited,
    Fail(u16),
    Panic,
    Hang,
}

/// Scriptable fetcher that records every invocation.
///
/// Unscripted identifiers succeed with `payload-<id>` after `latency`.
#[derive(Debug, Default)]
pub struct StubFetcher {
    behaviors: HashMap<String, StubBehavior>,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_behavior(mut self, identifier: &str, behavior: StubBehavior) -> Self {
        self.behaviors.insert(identifier.to_string(), behavior);
        self
    }

    pub fn rate_limiting(mut self, identifiers: &[&str]) -> Self {
        for identifier in identifiers {
            self.behaviors
                .insert(identifier.to_string(), StubBehavior::RateLimited);
        }
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> HashSet<String> {
        self.fetched.lock().iter().cloned().collect()
    }

    pub fn expected_payload(identifier: &str) -> String {
        format!("payload-{identifier}")
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, identifier: &str) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().push(identifier.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlightGuard(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.behaviors.get(identifier) {
            None => FetchOutcome::Success(Self::expected_payload(identifier)),
            Some(StubBehavior::RateLimited) => FetchOutcome::RateLimited,
            Some(StubBehavior::Fail(status)) => {
                FetchOutcome::Failed(FetchError::UnexpectedStatus { status: *status })
            }
            Some(StubBehavior::Panic) => panic!("stub fetcher panicked on {identifier}"),
            Some(StubBehavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                FetchOutcome::Success(Self::expected_payload(identifier))
            }
        }
    }
}
