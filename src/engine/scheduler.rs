//! # Batch Scheduler
//!
//! Splits the identifier list into consecutive windows and drives them strictly one
//! after another. Each window is deduplicated, its repeats folded into the run
//! tally, and the remaining identifiers handed to the [`WindowCoordinator`].

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::aggregator::RunMetadata;
use super::backoff::WindowBackoff;
use super::coordinator::{RunState, SharedRunState, WindowCoordinator};
use super::dedup::deduplicate;
use super::RunOutput;
use crate::config::BackoffConfig;
use crate::logging::log_window_operation;

#[derive(Debug, Clone)]
pub struct BatchScheduler {
    coordinator: WindowCoordinator,
    window_size: usize,
    backoff: BackoffConfig,
}

impl BatchScheduler {
    /// `window_size` must be non-zero; the engine validates it before construction.
    pub fn new(coordinator: WindowCoordinator, window_size: usize, backoff: BackoffConfig) -> Self {
        Self {
            coordinator,
            window_size,
            backoff,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of windows a list of `total` identifiers is split into
    pub fn window_count(&self, total: usize) -> usize {
        total.div_ceil(self.window_size)
    }

    pub async fn run(&self, ids: &[String]) -> RunOutput {
        let state: SharedRunState = Arc::new(Mutex::new(RunState::default()));
        let mut backoff = WindowBackoff::new(self.backoff.clone());
        let window_count = self.window_count(ids.len());

        info!(
            total_ids = ids.len(),
            window_size = self.window_size,
            windows = window_count,
            "Starting batch run"
        );

        for (index, window) in ids.chunks(self.window_size).enumerate() {
            let deduplicated = deduplicate(window);
            if deduplicated.duplicate_count > 0 {
                debug!(
                    window = index,
                    duplicates = deduplicated.duplicate_count,
                    "Dropped repeated identifiers"
                );
            }
            state.lock().tally.record_duplicates(&deduplicated);

            let report = self
                .coordinator
                .process_window(index, &deduplicated.unique, &state)
                .await;

            log_window_operation(
                index,
                window.len(),
                report.cache_hits,
                report.succeeded,
                report.failed,
                report.rate_limited,
                report.duration_ms,
            );

            let is_last = index + 1 == window_count;
            if let Some(delay) = backoff.after_window(report.rate_limited) {
                if !is_last {
                    warn!(
                        window = index,
                        rate_limited = report.rate_limited,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, delaying next window"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        // Every task has joined, so this is normally the only reference left
        let state = match Arc::try_unwrap(state) {
            Ok(state) => state.into_inner(),
            Err(shared) => std::mem::take(&mut *shared.lock()),
        };

        let metadata: RunMetadata = state.tally.finalize(ids);
        if !metadata.is_balanced() {
            warn!(
                total_ids = metadata.total_ids_count,
                accounted = metadata.accounted(),
                "Run accounting does not balance"
            );
        }

        info!(
            total_ids = metadata.total_ids_count,
            successful = metadata.number_of_successful_ids,
            failed = metadata.number_of_failed_ids,
            duplicates = metadata.duplicate_ids_count,
            cache_hits = metadata.cache_hits,
            count_429 = metadata.count_429,
            "Batch run complete"
        );

        RunOutput {
            results: state.results,
            metadata,
        }
    }
}
