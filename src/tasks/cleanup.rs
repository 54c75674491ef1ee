//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;

/// Removes every entry expired as of the start of the sweep.
///
/// Expired keys are collected under the read lock, then removed in chunks of
/// `chunk_size` keys per write-lock acquisition so readers are only held off
/// for one chunk at a time. Each key is re-checked before removal; a key that
/// was overwritten in the meantime keeps its new entry.
///
/// A removal that panics (for instance a value whose `Drop` panics) is logged
/// and skipped; the rest of the scan carries on.
///
/// Returns the number of entries removed cleanly.
pub async fn sweep<V>(store: &RwLock<CacheStore<V>>, chunk_size: usize) -> usize {
    let now = Instant::now();
    let expired = store.read().await.expired_keys(now);

    let mut removed = 0;
    let mut failed = 0;
    for chunk in expired.chunks(chunk_size.max(1)) {
        let mut guard = store.write().await;
        for key in chunk {
            match panic::catch_unwind(AssertUnwindSafe(|| guard.remove_if_expired(key, now))) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(_) => {
                    failed += 1;
                    warn!(key = %key, "TTL cleanup: removing expired entry panicked");
                }
            }
        }
    }

    if failed > 0 {
        warn!("TTL cleanup: {} entries failed to drop cleanly", failed);
    }
    removed
}

// == Cleanup Task ==
/// Handle to a running cleanup task.
///
/// Dropping the handle also signals the task to exit.
#[derive(Debug)]
pub struct CleanupTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    /// Signals the task to exit and waits for it.
    ///
    /// A sweep already running finishes first; none starts after this returns.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!("Cleanup task ended abnormally: {}", e);
        }
        info!("Cleanup task stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The first sweep runs one full `period` after spawning. Each sweep runs as
/// its own task so a panic that escapes it is logged and the schedule carries on.
/// A tick missed because a sweep overran is delayed rather than bunched up.
///
/// # Panics
/// Panics if `period` is zero.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::<String>::new()));
/// let cleanup = spawn_cleanup_task(store.clone(), Duration::from_secs(60), 1024);
/// // Later, during shutdown:
/// cleanup.stop().await;
/// ```
pub fn spawn_cleanup_task<V>(
    store: Arc<RwLock<CacheStore<V>>>,
    period: Duration,
    chunk_size: usize,
) -> CleanupTask
where
    V: Send + Sync + 'static,
{
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            period.as_secs_f64()
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                // A dropped sender counts as shutdown too
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            let sweep_store = Arc::clone(&store);
            match tokio::spawn(async move { sweep(&sweep_store, chunk_size).await }).await {
                Ok(0) => debug!("TTL cleanup: no expired entries found"),
                Ok(removed) => info!("TTL cleanup: removed {} expired entries", removed),
                Err(e) => error!("TTL cleanup sweep failed: {}", e),
            }
        }

        debug!("TTL cleanup loop exited");
    });

    CleanupTask { shutdown, handle }
}
