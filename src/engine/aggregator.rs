//! # Run Aggregator
//!
//! [`RunTally`] is the mutable per-run accumulator that window tasks merge into
//! while holding the run lock. After the last window, [`RunTally::finalize`] folds
//! it into the immutable [`RunMetadata`] record handed back to the caller.
//!
//! Every input identifier lands in exactly one bucket:
//! `successful + failed + duplicates + cache_hits == total_ids`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::dedup::{deduplicate, Deduplicated};

/// Mutable tallies built incrementally across all windows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTally {
    pub failed_ids: Vec<String>,
    pub successful_ids: Vec<String>,
    pub duplicate_count: usize,
    /// Every dropped repeat, possibly with the same identifier many times
    pub duplicate_ids: Vec<String>,
    pub rate_limited_count: usize,
    pub cache_hits: usize,
}

impl RunTally {
    pub fn record_duplicates(&mut self, window: &Deduplicated) {
        self.duplicate_count += window.duplicate_count;
        self.duplicate_ids.extend(window.duplicates.iter().cloned());
    }

    pub fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn record_success(&mut self, identifier: &str) {
        self.successful_ids.push(identifier.to_string());
    }

    /// A rate-limited identifier is a failure that is also counted separately
    pub fn record_failure(&mut self, identifier: &str, rate_limited: bool) {
        if rate_limited {
            self.rate_limited_count += 1;
        }
        self.failed_ids.push(identifier.to_string());
    }

    /// Identifiers accounted for so far
    pub fn accounted(&self) -> usize {
        self.successful_ids.len() + self.failed_ids.len() + self.duplicate_count + self.cache_hits
    }

    /// Assemble the end-of-run record. Pure; no I/O.
    pub fn finalize(self, total_ids: &[String]) -> RunMetadata {
        let unique_duplicate_ids = deduplicate(&self.duplicate_ids).unique;
        let number_of_failed_ids = self.failed_ids.len();
        let number_of_successful_ids = self.successful_ids.len();

        RunMetadata {
            total_ids_count: total_ids.len(),
            total_ids: total_ids.to_vec(),
            number_of_failed_ids,
            failed_ids: self.failed_ids,
            number_of_successful_ids,
            successful_ids: self.successful_ids,
            duplicate_ids_count: self.duplicate_count,
            unique_duplicate_ids,
            count_429: self.rate_limited_count,
            cache_hits: self.cache_hits,
            number_of_api_calls: number_of_successful_ids + number_of_failed_ids,
            total_response_time: None,
            total_response_time_ms: None,
        }
    }
}

/// End-of-run statistics, serialized as-is by the metadata sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub total_ids: Vec<String>,
    pub total_ids_count: usize,
    pub failed_ids: Vec<String>,
    pub number_of_failed_ids: usize,
    /// Identifiers that needed a live fetch and succeeded
    pub successful_ids: Vec<String>,
    pub number_of_successful_ids: usize,
    pub duplicate_ids_count: usize,
    /// Distinct identifiers that appeared more than once within a window
    pub unique_duplicate_ids: Vec<String>,
    pub count_429: usize,
    /// Identifiers served from the cache instead of the network
    pub cache_hits: usize,
    /// Live requests issued (successful + failed)
    pub number_of_api_calls: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_response_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_response_time_ms: Option<u64>,
}

impl RunMetadata {
    /// Record the wall-clock duration measured by the caller around the run
    pub fn record_elapsed(&mut self, elapsed: Duration) {
        self.total_response_time = Some(format!("{:.6} sec", elapsed.as_secs_f64()));
        self.total_response_time_ms = Some(elapsed.as_millis() as u64);
    }

    pub fn accounted(&self) -> usize {
        self.number_of_successful_ids
            + self.number_of_failed_ids
            + self.duplicate_ids_count
            + self.cache_hits
    }

    /// Whether every input identifier landed in exactly one bucket
    pub fn is_balanced(&self) -> bool {
        self.accounted() == self.total_ids_count
    }
}
