//! Cache Store Module
//!
//! Main cache engine composing a storage adapter, the metadata tracker and an
//! invalidation policy, and owning the reaper's lifecycle.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Entry, Metadata, MetadataTracker, StatsRecorder};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::policy::{InvalidationPolicy, NopPolicy};
use crate::storage::{MemoryStore, StorageAdapter};
use crate::tasks::{spawn_reaper, sweep};

// == Cache Core ==
/// State shared between the engine and its reaper.
pub(crate) struct CacheCore<V, S, P> {
    pub(crate) storage: S,
    pub(crate) policy: P,
    pub(crate) tracker: MetadataTracker,
    pub(crate) stats: StatsRecorder,
    /// Held shared by operations and sweeps, exclusively by clear and destroy
    pub(crate) gate: RwLock<()>,
    _value: PhantomData<fn() -> V>,
}

impl<V, S, P> CacheCore<V, S, P> {
    pub(crate) fn new(storage: S, policy: P, tracker_queue_capacity: usize) -> Self {
        Self {
            storage,
            policy,
            tracker: MetadataTracker::new(tracker_queue_capacity),
            stats: StatsRecorder::new(),
            gate: RwLock::new(()),
            _value: PhantomData,
        }
    }
}

impl<V, S, P> CacheCore<V, S, P>
where
    S: StorageAdapter<Entry<V>>,
{
    /// Reads the entry at `key` with the cache's live count attached.
    pub(crate) fn load(&self, key: &str) -> Result<Entry<V>> {
        let mut entry = self.storage.get(key)?;
        self.tracker.attach(&mut entry.metadata);
        Ok(entry)
    }
}

// == Cache ==
/// Thread-safe key/value cache with pluggable storage and invalidation.
///
/// All operations take `&self`; share the cache behind an `Arc` to use it
/// from several tasks.
pub struct Cache<V, S = MemoryStore<Entry<V>>, P = NopPolicy> {
    core: Arc<CacheCore<V, S, P>>,
    shutdown: CancellationToken,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl<V, P> Cache<V, MemoryStore<Entry<V>>, P>
where
    V: Clone + Debug + Send + Sync + 'static,
    P: InvalidationPolicy<V>,
{
    /// Creates a cache backed by a `MemoryStore`.
    ///
    /// # Arguments
    /// * `policy` - Decides which entries are stale and which may be created
    /// * `config` - Reaper interval and tracker queue capacity
    pub fn in_memory(policy: P, config: CacheConfig) -> Result<Self> {
        Self::new(MemoryStore::new(), policy, config)
    }
}

impl<V, S, P> Cache<V, S, P>
where
    V: Clone + Debug + Send + Sync + 'static,
    S: StorageAdapter<Entry<V>>,
    P: InvalidationPolicy<V>,
{
    // == Constructor ==
    /// Creates a cache and starts its tracker and reaper tasks.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `storage` - Adapter holding the entries
    /// * `policy` - Decides which entries are stale and which may be created
    /// * `config` - Reaper interval and tracker queue capacity
    ///
    /// `config.entry_lifetime` is not read here; it is for callers building a
    /// time-based policy.
    ///
    /// # Errors
    /// `InvalidArgument` if `config` does not validate.
    pub fn new(storage: S, policy: P, config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let core = Arc::new(CacheCore::new(
            storage,
            policy,
            config.tracker_queue_capacity,
        ));
        let shutdown = CancellationToken::new();
        let reaper = spawn_reaper(core.clone(), config.reap_interval, shutdown.clone());

        info!(
            "Cache started: reap_interval={:?}, tracker_queue={}",
            config.reap_interval, config.tracker_queue_capacity
        );

        Ok(Self {
            core,
            shutdown,
            reaper: Mutex::new(Some(reaper)),
        })
    }

    // == Put ==
    /// Stores `value` under `key`.
    ///
    /// Returns the previous value when an existing entry was overwritten, or
    /// `None` when a new entry was created. Only new keys go through the
    /// policy's creation veto.
    ///
    /// An overwrite reads the entry and writes it back. A `remove` or eviction
    /// landing in between is undone by the write-back (last writer wins), and
    /// the live count stays one short until the key is removed again.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    pub async fn put(&self, key: impl Into<String>, value: V) -> Result<Option<V>> {
        let key = key.into();
        let _gate = self.core.gate.read().await;
        self.ensure_alive()?;

        match self.core.load(&key) {
            Ok(mut entry) => {
                self.core
                    .tracker
                    .update(&mut entry.metadata, |m| self.core.policy.update_extra(m));
                let previous = std::mem::replace(&mut entry.value, value);
                self.core.storage.put(key, entry)?;
                Ok(Some(previous))
            }
            Err(e) if e.is_not_found() => {
                self.insert(key, value).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // == Get ==
    /// Retrieves the value at `key`, refreshing its access stamp.
    ///
    /// The stamp is written back the same way `put` overwrites, so the same
    /// last-writer-wins race applies.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    ///
    /// # Errors
    /// `NotFound` if nothing is stored under `key`.
    pub async fn get(&self, key: &str) -> Result<V> {
        self.fetch(key, None).await
    }

    /// Retrieves the value at `key`, storing and returning `default` on a miss.
    pub async fn get_or_put(&self, key: &str, default: V) -> Result<V> {
        self.fetch(key, Some(default)).await
    }

    /// Retrieves the value at `key` with an optional default.
    ///
    /// At most one default may be supplied; more is an `InvalidArgument`.
    pub async fn get_with_defaults(&self, key: &str, defaults: Vec<V>) -> Result<V> {
        if defaults.len() > 1 {
            return Err(CacheError::InvalidArgument(format!(
                "only a single value can be supplied as a default, got {}",
                defaults.len()
            )));
        }
        self.fetch(key, defaults.into_iter().next()).await
    }

    // == Remove ==
    /// Removes the entry at `key` and returns its value.
    ///
    /// # Arguments
    /// * `key` - The key to delete
    ///
    /// # Errors
    /// `NotFound` if nothing is stored under `key`. `CorruptEntry` if the
    /// stored item could not be decoded; it is removed all the same.
    pub async fn remove(&self, key: &str) -> Result<V> {
        let _gate = self.core.gate.read().await;
        self.ensure_alive()?;

        let found = match self.core.load(key) {
            Err(CacheError::CorruptEntry(_)) => None,
            other => Some(other?),
        };
        self.core.storage.remove(key)?;
        self.core.tracker.remove().await?;

        match found {
            Some(entry) => {
                debug!(key = %key, "Entry removed");
                Ok(entry.value)
            }
            None => {
                warn!(key = %key, "Removed corrupt entry");
                Err(CacheError::CorruptEntry(key.to_string()))
            }
        }
    }

    // == Clear ==
    /// Removes every entry and resets the live count to zero.
    ///
    /// Waits for in-flight operations to finish first. Count changes queued
    /// but not yet applied when the tracker restarts are dropped.
    pub async fn clear(&self) -> Result<()> {
        let _gate = self.core.gate.write().await;
        self.ensure_alive()?;

        self.core.storage.clear()?;
        self.core.policy.stop();
        self.core.tracker.reset().await;
        info!("Cache cleared");
        Ok(())
    }

    // == Destroy ==
    /// Stops the reaper and releases the cache's contents.
    ///
    /// Every later operation fails with `Destroyed`. Calling this again is a
    /// no-op.
    pub async fn destroy(&self) {
        let Some(reaper) = self.reaper.lock().await.take() else {
            return;
        };
        self.shutdown.cancel();
        let _ = reaper.await;

        let _gate = self.core.gate.write().await;
        if let Err(e) = self.core.storage.clear() {
            warn!(error = %e, "Failed to clear storage on destroy");
        }
        self.core.tracker.shutdown().await;
        self.core.policy.stop();
        info!("Cache destroyed");
    }

    // == Reap Now ==
    /// Runs one reaper sweep immediately and returns how many entries it evicted.
    pub async fn reap_now(&self) -> Result<usize> {
        self.ensure_alive()?;
        Ok(sweep(&*self.core, &self.shutdown).await)
    }

    // == Metadata ==
    /// Returns the metadata stored for `key` without touching the entry.
    pub fn metadata(&self, key: &str) -> Result<Metadata> {
        self.ensure_alive()?;
        Ok(self.core.load(key)?.metadata)
    }

    // == Live Count ==
    /// Returns the live entry count as last published by the tracker.
    pub fn live_count(&self) -> i64 {
        self.core.tracker.live_count().get()
    }

    /// Waits for pending count changes to apply, then returns the live count.
    pub async fn settled_count(&self) -> Result<i64> {
        self.ensure_alive()?;
        self.core.tracker.settled().await
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.core.stats.snapshot(self.live_count())
    }

    // == Length ==
    /// Returns the number of entries held by the storage adapter.
    pub fn len(&self) -> usize {
        self.core.storage.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.core.storage.is_empty()
    }

    async fn fetch(&self, key: &str, default: Option<V>) -> Result<V> {
        let _gate = self.core.gate.read().await;
        self.ensure_alive()?;

        match self.core.load(key) {
            Ok(mut entry) => {
                self.core
                    .tracker
                    .access(&mut entry.metadata, |m| self.core.policy.access_extra(m));
                let value = entry.value.clone();
                self.core.storage.put(key.to_string(), entry)?;
                self.core.stats.record_hit();
                Ok(value)
            }
            Err(e) if e.is_not_found() => {
                self.core.stats.record_miss();
                match default {
                    Some(value) => {
                        self.insert(key.to_string(), value.clone()).await?;
                        Ok(value)
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn insert(&self, key: String, value: V) -> Result<()> {
        if !self.core.policy.can_create(&key, &value) {
            return Err(CacheError::CreationDenied {
                key,
                value: format!("{:?}", value),
            });
        }

        let mut metadata = Metadata::new();
        self.core
            .tracker
            .create(&mut metadata, |m| self.core.policy.create_extra(m))
            .await?;

        let entry = Entry::new(key.as_str(), value, metadata);
        if let Err(e) = self.core.storage.put(key.clone(), entry) {
            // Undo the count for an entry that never landed
            if let Err(undo) = self.core.tracker.remove().await {
                warn!(key = %key, error = %undo, "Failed to uncount unstored entry");
            }
            return Err(e);
        }
        Ok(())
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.shutdown.is_cancelled() {
            Err(CacheError::Destroyed)
        } else {
            Ok(())
        }
    }
}

impl<V, S, P> Drop for Cache<V, S, P> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
