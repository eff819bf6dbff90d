//! Cache Module
//!
//! Provides the cache engine, entry metadata and the live count tracker.

mod entry;
mod stats;
mod store;
mod tracker;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{now_ms, Entry, LiveCount, Metadata, Timestamp, UNSET};
pub use stats::{CacheStats, StatsRecorder};
pub use store::Cache;
pub use tracker::MetadataTracker;

pub(crate) use store::CacheCore;
