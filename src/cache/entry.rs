//! Cache Entry Module
//!
//! Defines stored entries and the metadata attached to each of them.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Unix timestamp in milliseconds.
pub type Timestamp = i64;

/// Marks a lifecycle stamp that has not happened yet.
pub const UNSET: Timestamp = -1;

// == Live Count ==
/// Shared handle to a cache's live entry counter.
///
/// Only the metadata tracker writes the value; everyone else reads it.
/// The count is eventually consistent and may be briefly negative.
#[derive(Debug, Clone, Default)]
pub struct LiveCount(Arc<AtomicI64>);

impl LiveCount {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently published count.
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn publish(&self, count: i64) {
        self.0.store(count, Ordering::Release);
    }

    /// Returns true if both handles observe the same counter.
    pub fn same_counter(&self, other: &LiveCount) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// == Metadata ==
/// Lifecycle information used by invalidation policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// When the entry was first inserted
    pub created: Timestamp,
    /// Last successful read
    pub accessed: Timestamp,
    /// Last overwrite
    pub modified: Timestamp,
    /// Live entry count of the owning cache
    #[serde(skip)]
    pub live_count: LiveCount,
    /// Policy-owned data; the engine never looks inside
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl Metadata {
    // == Constructor ==
    /// Creates metadata with every stamp unset.
    pub fn new() -> Self {
        Self {
            created: UNSET,
            accessed: UNSET,
            modified: UNSET,
            live_count: LiveCount::new(),
            extra: serde_json::Value::Null,
        }
    }

    // == Last Touched ==
    /// Returns the most recent of the created, accessed and modified stamps.
    pub fn last_touched(&self) -> Timestamp {
        self.created.max(self.accessed).max(self.modified)
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

// == Entry ==
/// A stored value together with its key and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry<V> {
    pub key: String,
    pub value: V,
    pub metadata: Metadata,
}

impl<V> Entry<V> {
    /// Creates an entry around already-stamped metadata.
    pub fn new(key: impl Into<String>, value: V, metadata: Metadata) -> Self {
        Self {
            key: key.into(),
            value,
            metadata,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn now_ms() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
