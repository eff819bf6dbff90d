//! In-memory storage holding serde_json-encoded items.
//!
//! Items are encoded on the way in and decoded on the way out, so anything
//! that fails to decode into the requested type is reported as a corrupt
//! entry instead of being handed back.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{CacheError, Result};
use crate::storage::StorageAdapter;

// == Encoded Store ==
/// Thread-safe store of JSON bytes.
#[derive(Debug, Default)]
pub struct EncodedStore {
    items: DashMap<String, Vec<u8>>,
}

impl EncodedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw bytes under `key` without encoding them.
    pub fn insert_raw(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.items.insert(key.into(), bytes.into());
    }
}

impl<T> StorageAdapter<T> for EncodedStore
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn put(&self, key: String, item: T) -> Result<()> {
        let bytes = serde_json::to_vec(&item)
            .map_err(|e| CacheError::Storage(format!("failed to encode '{}': {}", key, e)))?;
        self.items.insert(key, bytes);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<T> {
        let bytes = self
            .items
            .get(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        serde_json::from_slice(bytes.value())
            .map_err(|_| CacheError::CorruptEntry(key.to_string()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.items
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn clear(&self) -> Result<()> {
        self.items.clear();
        Ok(())
    }

    fn range(&self, visit: &mut dyn FnMut(&str, &T) -> bool) {
        for item in self.items.iter() {
            let decoded: T = match serde_json::from_slice(item.value()) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(key = %item.key(), error = %e, "Skipping undecodable entry");
                    continue;
                }
            };
            if !visit(item.key(), &decoded) {
                break;
            }
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
