//! Cache Service
//!
//! The public face of the cache: a cloneable handle over the shared store, the
//! single-flight registry, and the cleanup task's lifecycle.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore, Flight, FlightRegistry, Lookup};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_cleanup_task, sweep, CleanupTask};

/// Shared cache handle.
///
/// Cloning is cheap and every clone operates on the same store, so the service
/// is built once at startup and handed to whatever needs it. Stopping any
/// clone stops the cleanup task for all of them.
pub struct CacheService<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    flights: Arc<FlightRegistry<V>>,
    cleanup: Arc<Mutex<Option<CleanupTask>>>,
    sweep_chunk_size: usize,
}

impl<V> Clone for CacheService<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            flights: Arc::clone(&self.flights),
            cleanup: Arc::clone(&self.cleanup),
            sweep_chunk_size: self.sweep_chunk_size,
        }
    }
}

impl<V> CacheService<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates the service and launches its cleanup task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut service = Self::unscheduled(config.sweep_chunk_size);
        let task = spawn_cleanup_task(
            Arc::clone(&service.store),
            config.cleanup_period(),
            config.sweep_chunk_size,
        );
        service.cleanup = Arc::new(Mutex::new(Some(task)));

        info!(
            cleanup_interval = config.cleanup_interval,
            sweep_chunk_size = config.sweep_chunk_size,
            "Cache service started"
        );
        Ok(service)
    }

    /// Creates a service with no cleanup task; expired entries are only
    /// reclaimed by reads or explicit [`sweep`](Self::sweep) calls.
    pub fn unscheduled(sweep_chunk_size: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new())),
            flights: Arc::new(FlightRegistry::new()),
            cleanup: Arc::new(Mutex::new(None)),
            sweep_chunk_size: sweep_chunk_size.max(1),
        }
    }

    /// Stops the cleanup task and waits for it to exit.
    ///
    /// Calling this again, or on an unscheduled service, does nothing. The
    /// slot stays locked until the task has exited, so a concurrent `stop`
    /// from another clone also returns only once no sweep is running.
    pub async fn stop(&self) {
        let mut slot = self.cleanup.lock().await;
        if let Some(task) = slot.take() {
            task.stop().await;
            info!("Cache service stopped");
        }
    }

    /// Returns true while the cleanup task is running.
    pub async fn is_running(&self) -> bool {
        self.cleanup
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    // == Get ==
    /// Returns the value for `key` if present and unexpired.
    ///
    /// Probes under the read lock; the write lock is only taken to remove an
    /// entry found expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        match self.store.read().await.peek(key) {
            Lookup::Hit(value) => return Some(value),
            Lookup::Missing => return None,
            Lookup::Expired => {}
        }
        // Re-checked under the write lock; the key may have been set again
        self.store.write().await.get(key)
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    ///
    /// A zero `ttl` stores an entry that is already expired.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.store.write().await.set(key.into(), value, ttl);
    }

    // == Delete ==
    /// Removes `key`, expired or not. Returns true if an entry existed.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    // == Has ==
    /// Returns true if `key` is present and unexpired.
    pub async fn has(&self, key: &str) -> bool {
        match self.store.read().await.peek(key) {
            Lookup::Hit(_) => return true,
            Lookup::Missing => return false,
            Lookup::Expired => {}
        }
        self.store.write().await.has(key)
    }

    // == Clear ==
    /// Drops every entry.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    // == Get Many ==
    /// Returns the live subset of `keys`; missing and expired keys are omitted.
    pub async fn get_many<I, K>(&self, keys: I) -> HashMap<String, V>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut store = self.store.write().await;
        keys.into_iter()
            .filter_map(|key| {
                let key = key.as_ref();
                store.get(key).map(|value| (key.to_string(), value))
            })
            .collect()
    }

    // == Set Many ==
    /// Stores every pair with the same `ttl`. Each entry expires on its own.
    pub async fn set_many<I, K>(&self, entries: I, ttl: Duration)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let mut store = self.store.write().await;
        for (key, value) in entries {
            store.set(key.into(), value, ttl);
        }
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, computing and storing it on a miss.
    ///
    /// Concurrent misses on the same key share one `factory` call: the first
    /// caller runs it and the rest wait for its result, success or failure.
    /// A failed factory caches nothing and the key is left as it was. If the
    /// computing caller is cancelled before finishing, one of the waiting
    /// callers runs its own factory instead.
    ///
    /// The cache puts no deadline on `factory`.
    pub async fn get_or_set<F, Fut, E>(&self, key: &str, factory: F, ttl: Duration) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: Into<anyhow::Error>,
    {
        loop {
            if let Some(value) = self.get(key).await {
                return Ok(value);
            }

            match self.flights.join(key) {
                Flight::Leader(guard) => {
                    // Another leader may have stored the value after our miss
                    if let Some(value) = self.get(key).await {
                        guard.complete(Ok(value.clone()));
                        return Ok(value);
                    }

                    let outcome = match factory().await {
                        Ok(value) => {
                            self.set(key, value.clone(), ttl).await;
                            Ok(value)
                        }
                        Err(e) => Err(CacheError::factory(key, e)),
                    };
                    guard.complete(outcome.clone());
                    return outcome;
                }
                Flight::Follower(mut rx) => {
                    let published = rx.wait_for(Option::is_some).await.map(|r| (*r).clone());
                    match published {
                        Ok(Some(outcome)) => return outcome,
                        Ok(None) | Err(_) => {
                            debug!(key, "Leader abandoned computation, retrying");
                        }
                    }
                }
            }
        }
    }

    // == Stats ==
    /// Counts live and expired entries without removing anything.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats(Instant::now())
    }

    /// Remaining lifetime of `key`, or `None` if it is missing or expired.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.store.read().await.ttl_remaining(key)
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Runs one sweep now, independent of the cleanup schedule.
    pub async fn sweep(&self) -> usize {
        sweep(&self.store, self.sweep_chunk_size).await
    }

    /// Number of keys with a `get_or_set` computation in progress.
    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }
}
