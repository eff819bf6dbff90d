//! Mini Cache - A pluggable in-memory key/value cache
//!
//! Separates how data is stored (`StorageAdapter`) from how staleness is
//! decided (`InvalidationPolicy`), tracks per-entry metadata and evicts stale
//! entries from a background reaper.

pub mod cache;
pub mod config;
pub mod error;
pub mod policy;
pub mod storage;
mod tasks;

pub use cache::{Cache, CacheStats, Entry, Metadata};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use policy::{InvalidationPolicy, NopPolicy, TimedPolicy};
pub use storage::{EncodedStore, MemoryStore, StorageAdapter};
