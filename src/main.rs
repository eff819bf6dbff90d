//! Mini Cache - demo driver
//!
//! Fills a cache backed by the time-based policy, then reports the live count
//! while the reaper evicts entries as they go stale.

use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::{Cache, CacheConfig, Entry, MemoryStore, TimedPolicy};

type DemoCache = Cache<String, MemoryStore<Entry<String>>, TimedPolicy>;

const DEMO_ENTRIES: usize = 100;
const DEFAULT_LIFETIME: Duration = Duration::from_secs(2);

/// Main entry point for the Mini Cache demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create a cache with the time-based invalidation policy
/// 4. Insert entries and keep half of them warm
/// 5. Report until the cache drains or Ctrl+C is received
/// 6. Destroy the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Cache demo");

    let config = CacheConfig::from_env();
    let lifetime = config.entry_lifetime.unwrap_or(DEFAULT_LIFETIME);
    info!(
        "Configuration loaded: reap_interval={:?}, tracker_queue={}, lifetime={:?}",
        config.reap_interval, config.tracker_queue_capacity, lifetime
    );

    let cache: DemoCache = Cache::in_memory(TimedPolicy::new(lifetime), config)?;

    for i in 0..DEMO_ENTRIES {
        cache.put(format!("key{}", i), format!("value{}", i)).await?;
    }
    info!(
        "Inserted {} entries, live count {}",
        DEMO_ENTRIES,
        cache.settled_count().await?
    );

    tokio::select! {
        result = report(&cache, lifetime) => result?,
        _ = signal::ctrl_c() => {
            warn!("Received Ctrl+C, stopping early");
        }
    }

    info!("Final stats: {}", serde_json::to_string(&cache.stats())?);
    cache.destroy().await;
    info!("Demo complete");
    Ok(())
}

/// Keeps even keys warm for a few lifetimes, then lets everything expire.
async fn report(cache: &DemoCache, lifetime: Duration) -> anyhow::Result<()> {
    let step = lifetime / 2;

    for round in 0..4 {
        tokio::time::sleep(step).await;
        for i in (0..DEMO_ENTRIES).step_by(2) {
            // Odd keys may already be gone; even keys are refreshed here
            let _ = cache.get(&format!("key{}", i)).await;
        }
        info!("Round {}: live count {}", round, cache.live_count());
    }

    while !cache.is_empty() {
        tokio::time::sleep(step).await;
        info!("Draining: live count {}", cache.live_count());
    }
    Ok(())
}
