//! In-memory storage backed by a concurrent map.

use dashmap::DashMap;

use crate::error::{CacheError, Result};
use crate::storage::StorageAdapter;

// == Memory Store ==
/// Thread-safe in-memory store.
///
/// Uses `DashMap` so operations on different keys do not contend.
#[derive(Debug)]
pub struct MemoryStore<T> {
    items: DashMap<String, T>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StorageAdapter<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn put(&self, key: String, item: T) -> Result<()> {
        self.items.insert(key, item);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<T> {
        self.items
            .get(key)
            .map(|item| item.value().clone())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
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
            if !visit(item.key(), item.value()) {
                break;
            }
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
