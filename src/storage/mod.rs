//! Storage Module
//!
//! Pluggable backing stores used by the cache engine.
//!
//! # Adapters
//! - `MemoryStore`: concurrent map holding items as-is
//! - `EncodedStore`: concurrent map holding JSON-encoded items

mod encoded;
mod memory;

pub use encoded::EncodedStore;
pub use memory::MemoryStore;

use crate::error::Result;

// == Storage Adapter ==
/// Key/value backing store for cache entries.
///
/// Implementations must make `put`, `get` and `remove` atomic per key.
pub trait StorageAdapter<T>: Send + Sync + 'static {
    /// Stores `item` under `key`, replacing anything already there.
    fn put(&self, key: String, item: T) -> Result<()>;

    /// Loads the item at `key`. Fails with `NotFound` when absent.
    fn get(&self, key: &str) -> Result<T>;

    /// Deletes the item at `key`. Fails with `NotFound` when absent.
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes every item.
    fn clear(&self) -> Result<()>;

    /// Visits items until `visit` returns false.
    ///
    /// `visit` must not call back into the store.
    fn range(&self, visit: &mut dyn FnMut(&str, &T) -> bool);

    /// Number of stored items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
