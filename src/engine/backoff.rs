//! Pause between windows after rate limiting.
//!
//! Windows remain the only admission control. When enabled, a window that saw any
//! 429 responses delays the start of the next window; consecutive rate-limited
//! windows grow the delay exponentially and a clean window resets it.

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use std::time::Duration;

use crate::config::BackoffConfig;

pub struct WindowBackoff {
    config: BackoffConfig,
    current: Option<ExponentialBackoff>,
}

impl std::fmt::Debug for WindowBackoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowBackoff")
            .field("config", &self.config)
            .field("backing_off", &self.current.is_some())
            .finish()
    }
}

impl WindowBackoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn build(&self) -> ExponentialBackoff {
        ExponentialBuilder::default()
            .with_factor(self.config.factor)
            .with_min_delay(self.config.min_delay())
            .with_max_delay(self.config.max_delay())
            .with_max_times(self.config.max_times)
            .build()
    }

    /// Delay to wait before the next window, given the 429 count of the window
    /// that just finished. Once the schedule is exhausted the maximum delay repeats.
    pub fn after_window(&mut self, rate_limited: usize) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }
        if rate_limited == 0 {
            self.current = None;
            return None;
        }

        if self.current.is_none() {
            self.current = Some(self.build());
        }
        let next = self.current.as_mut().and_then(Iterator::next);
        Some(next.unwrap_or_else(|| self.config.max_delay()))
    }
}
