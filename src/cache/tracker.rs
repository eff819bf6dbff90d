//! Metadata Tracker Module
//!
//! Stamps entry lifecycle events and owns the live entry counter.
//!
//! The counter lives inside a dedicated task. Callers never touch the integer;
//! they submit signed deltas through a bounded queue, so increments and
//! decrements are applied in submission order without a shared lock.

use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::entry::{now_ms, LiveCount, Metadata};
use crate::error::{CacheError, Result};

enum Command {
    Adjust(i64),
    Settle(oneshot::Sender<i64>),
}

struct Actor {
    tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Actor {
    fn spawn(capacity: usize, count: LiveCount) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(rx, count, cancel.clone()));
        Self { tx, cancel, handle }
    }

    async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

async fn run(mut rx: mpsc::Receiver<Command>, count: LiveCount, cancel: CancellationToken) {
    let mut current: i64 = 0;
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            cmd = rx.recv() => match cmd {
                Some(Command::Adjust(delta)) => {
                    current += delta;
                    count.publish(current);
                }
                Some(Command::Settle(reply)) => {
                    let _ = reply.send(current);
                }
                None => break,
            },
        }
    }
    debug!(count = current, "Metadata tracker stopped");
}

// == Metadata Tracker ==
/// Per-cache actor that serializes live count changes.
pub struct MetadataTracker {
    actor: RwLock<Option<Actor>>,
    count: LiveCount,
    capacity: usize,
}

impl MetadataTracker {
    // == Constructor ==
    /// Starts a tracker whose queue holds at most `capacity` pending commands.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(capacity: usize) -> Self {
        let count = LiveCount::new();
        Self {
            actor: RwLock::new(Some(Actor::spawn(capacity, count.clone()))),
            count,
            capacity,
        }
    }

    /// Returns the shared counter handle.
    pub fn live_count(&self) -> LiveCount {
        self.count.clone()
    }

    /// Points `metadata` at this tracker's counter.
    ///
    /// Stores that encode entries lose the handle, so every read re-attaches it.
    pub fn attach(&self, metadata: &mut Metadata) {
        metadata.live_count = self.count.clone();
    }

    // == Create ==
    /// Counts a new entry and stamps its creation time.
    ///
    /// `accessed` and `modified` are reset to the unset sentinel before `hook`
    /// runs.
    pub async fn create(
        &self,
        metadata: &mut Metadata,
        hook: impl FnOnce(&mut Metadata),
    ) -> Result<()> {
        self.submit(Command::Adjust(1)).await?;
        *metadata = Metadata::new();
        metadata.created = now_ms();
        metadata.live_count = self.count.clone();
        hook(metadata);
        Ok(())
    }

    // == Update ==
    /// Stamps an overwrite. No counter effect.
    pub fn update(&self, metadata: &mut Metadata, hook: impl FnOnce(&mut Metadata)) {
        metadata.modified = now_ms();
        metadata.live_count = self.count.clone();
        hook(metadata);
    }

    // == Access ==
    /// Stamps a read. No counter effect.
    pub fn access(&self, metadata: &mut Metadata, hook: impl FnOnce(&mut Metadata)) {
        metadata.accessed = now_ms();
        metadata.live_count = self.count.clone();
        hook(metadata);
    }

    // == Remove ==
    /// Uncounts an entry.
    pub async fn remove(&self) -> Result<()> {
        self.submit(Command::Adjust(-1)).await
    }

    // == Settled ==
    /// Waits until every previously submitted delta is applied and returns the count.
    pub async fn settled(&self) -> Result<i64> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Settle(reply)).await?;
        rx.await
            .map_err(|_| CacheError::Internal("metadata tracker stopped".to_string()))
    }

    // == Reset ==
    /// Tears down the running actor and starts a fresh one at zero.
    ///
    /// Deltas still queued in the old actor are dropped.
    pub async fn reset(&self) {
        let mut guard = self.actor.write().await;
        if let Some(old) = guard.take() {
            old.stop().await;
        }
        self.count.publish(0);
        *guard = Some(Actor::spawn(self.capacity, self.count.clone()));
        debug!("Metadata tracker reset");
    }

    // == Shutdown ==
    /// Stops the actor for good. Later submissions fail.
    pub async fn shutdown(&self) {
        let mut guard = self.actor.write().await;
        if let Some(old) = guard.take() {
            old.stop().await;
        }
    }

    async fn submit(&self, cmd: Command) -> Result<()> {
        let guard = self.actor.read().await;
        let actor = guard
            .as_ref()
            .ok_or_else(|| CacheError::Internal("metadata tracker is not running".to_string()))?;
        actor
            .tx
            .send(cmd)
            .await
            .map_err(|_| CacheError::Internal("metadata tracker is not running".to_string()))
    }
}
