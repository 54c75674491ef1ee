//! Single-Flight Module
//!
//! Tracks in-progress factory computations so concurrent cache misses on the
//! same key share one computation.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::error::Result;

/// Value published to waiters; `None` until the leader settles.
type Outcome<V> = Option<Result<V>>;

// == Flight ==
/// Role of a caller that missed the cache.
pub enum Flight<V> {
    /// This caller runs the factory and must settle the guard.
    Leader(FlightGuard<V>),
    /// Another caller is already computing; wait on its outcome.
    Follower(watch::Receiver<Outcome<V>>),
}

// == Flight Registry ==
/// Per-key in-flight markers.
pub struct FlightRegistry<V> {
    flights: DashMap<String, watch::Receiver<Outcome<V>>>,
}

impl<V> Default for FlightRegistry<V> {
    fn default() -> Self {
        Self {
            flights: DashMap::new(),
        }
    }
}

impl<V> FlightRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `key`.
    ///
    /// The first caller becomes the leader and owns the marker; everyone
    /// arriving while it is registered becomes a follower.
    pub fn join(self: &Arc<Self>, key: &str) -> Flight<V> {
        match self.flights.entry(key.to_string()) {
            Entry::Occupied(occupied) => {
                debug!(key, "Joining in-flight computation");
                Flight::Follower(occupied.get().clone())
            }
            Entry::Vacant(vacant) => {
                let (tx, rx) = watch::channel(None);
                vacant.insert(rx);
                debug!(key, "Leading computation");
                Flight::Leader(FlightGuard {
                    registry: Arc::clone(self),
                    key: key.to_string(),
                    tx: Some(tx),
                })
            }
        }
    }

    /// Number of keys with a computation in progress.
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }
}

// == Flight Guard ==
/// Ownership of a key's in-flight marker.
///
/// Dropping the guard without completing it (the leader was cancelled or
/// panicked) removes the marker and closes the channel, which wakes followers
/// so one of them can take over.
pub struct FlightGuard<V> {
    registry: Arc<FlightRegistry<V>>,
    key: String,
    tx: Option<watch::Sender<Outcome<V>>>,
}

impl<V> FlightGuard<V> {
    /// Removes the marker and publishes the outcome to every follower.
    pub fn complete(mut self, outcome: Result<V>) {
        self.registry.flights.remove(&self.key);
        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(outcome));
        }
    }
}

impl<V> Drop for FlightGuard<V> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            // Unregister before closing so woken followers cannot rejoin a dead marker
            self.registry.flights.remove(&self.key);
            drop(tx);
            debug!(key = %self.key, "In-flight computation abandoned");
        }
    }
}
