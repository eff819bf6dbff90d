//! Reaper Task
//!
//! Background task that periodically evicts entries the invalidation policy
//! rejects.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{CacheCore, Entry};
use crate::policy::InvalidationPolicy;
use crate::storage::StorageAdapter;

/// Spawns the background sweep loop for one cache.
///
/// The task sleeps for `interval` between sweeps and exits once `shutdown`
/// is cancelled. A sweep in progress stops at the next entry boundary.
///
/// # Arguments
/// * `core` - Storage, policy and tracker shared with the cache
/// * `interval` - Time between sweeps
/// * `shutdown` - Cancelled by the cache on destroy or drop
///
/// # Returns
/// A JoinHandle for the spawned task, awaited by the cache on destroy.
pub(crate) fn spawn_reaper<V, S, P>(
    core: Arc<CacheCore<V, S, P>>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
    S: StorageAdapter<Entry<V>>,
    P: InvalidationPolicy<V>,
{
    tokio::spawn(async move {
        info!("Starting reaper with interval of {:?}", interval);

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Reaper shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    let removed = sweep(&*core, &shutdown).await;
                    if removed > 0 {
                        info!("Reaper: removed {} invalid entries", removed);
                    } else {
                        debug!("Reaper: no invalid entries found");
                    }
                }
            }
        }
    })
}

/// Runs a single pass over the store and evicts invalid entries.
///
/// Returns the number of entries this pass removed. Entries that vanish or
/// get refreshed between the scan and the removal are left alone.
pub(crate) async fn sweep<V, S, P>(
    core: &CacheCore<V, S, P>,
    shutdown: &CancellationToken,
) -> usize
where
    V: Clone + Send + Sync + 'static,
    S: StorageAdapter<Entry<V>>,
    P: InvalidationPolicy<V>,
{
    let mut stale = Vec::new();
    core.storage.range(&mut |key, entry| {
        if shutdown.is_cancelled() {
            return false;
        }
        let mut metadata = entry.metadata.clone();
        core.tracker.attach(&mut metadata);
        if !core.policy.is_valid(&metadata) {
            stale.push(key.to_string());
        }
        true
    });

    // Keeps clear() from resetting the counter mid-removal
    let _gate = core.gate.read().await;

    let mut removed = 0;
    for key in stale {
        if shutdown.is_cancelled() {
            debug!("Reaper: sweep aborted by shutdown");
            break;
        }

        match core.load(&key) {
            Ok(entry) if !core.policy.is_valid(&entry.metadata) => {}
            Ok(_) => continue,
            Err(e) if e.is_not_found() => continue,
            Err(e) => {
                warn!(key = %key, error = %e, "Reaper: failed to re-read entry");
                continue;
            }
        }

        match core.storage.remove(&key) {
            Ok(()) => {
                if let Err(e) = core.tracker.remove().await {
                    warn!(key = %key, error = %e, "Reaper: failed to uncount entry");
                }
                core.stats.record_eviction();
                removed += 1;
            }
            // Someone else got there first
            Err(e) if e.is_not_found() => {}
            Err(e) => warn!(key = %key, error = %e, "Reaper: failed to remove entry"),
        }
    }

    removed
}
