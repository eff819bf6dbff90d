//! Configuration Module
//!
//! Handles loading and validating cache construction parameters.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

const DEFAULT_REAP_INTERVAL_MS: u64 = 100;
const DEFAULT_TRACKER_QUEUE: usize = 1024;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Interval between reaper sweeps
    pub reap_interval: Duration,
    /// Capacity of the metadata tracker's command queue
    pub tracker_queue_capacity: usize,
    /// Entry lifetime for time-based invalidation, None = entries never go stale.
    /// The engine ignores it; callers pass it to `TimedPolicy::new`.
    pub entry_lifetime: Option<Duration>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_REAP_INTERVAL_MS` - Reaper sweep interval (default: 100)
    /// - `CACHE_TRACKER_QUEUE` - Tracker queue capacity (default: 1024)
    /// - `CACHE_ENTRY_LIFETIME_MS` - Entry lifetime (default: unset)
    pub fn from_env() -> Self {
        Self {
            reap_interval: Duration::from_millis(
                env::var("CACHE_REAP_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_REAP_INTERVAL_MS),
            ),
            tracker_queue_capacity: env::var("CACHE_TRACKER_QUEUE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TRACKER_QUEUE),
            entry_lifetime: env::var("CACHE_ENTRY_LIFETIME_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis),
        }
    }

    /// Sets the reaper sweep interval.
    pub fn with_reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = interval;
        self
    }

    /// Sets the tracker queue capacity.
    pub fn with_tracker_queue_capacity(mut self, capacity: usize) -> Self {
        self.tracker_queue_capacity = capacity;
        self
    }

    /// Sets the entry lifetime.
    pub fn with_entry_lifetime(mut self, lifetime: Duration) -> Self {
        self.entry_lifetime = Some(lifetime);
        self
    }

    // == Validate ==
    /// Rejects parameters the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.reap_interval.is_zero() {
            return Err(CacheError::InvalidArgument(
                "reap interval must be greater than zero".to_string(),
            ));
        }
        if self.tracker_queue_capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "tracker queue capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            reap_interval: Duration::from_millis(DEFAULT_REAP_INTERVAL_MS),
            tracker_queue_capacity: DEFAULT_TRACKER_QUEUE,
            entry_lifetime: None,
        }
    }
}
