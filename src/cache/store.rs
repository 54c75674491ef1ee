//! Cache Store Module
//!
//! Key/value map with per-entry expiry. Callers wrap it in a lock; every method
//! here is synchronous and infallible.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats};

// == Lookup ==
/// Result of probing a key without mutating the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Present and unexpired
    Hit(V),
    /// Present but past its expiry; a mutable read would remove it
    Expired,
    /// Never set, deleted, or already removed
    Missing,
}

// == Cache Store ==
/// Entry storage with lazy expiry on reads.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    // == Set ==
    /// Stores a value that expires `ttl` from now.
    ///
    /// An existing entry under the same key is replaced outright, value and expiry.
    pub fn set(&mut self, key: String, value: V, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Delete ==
    /// Removes an entry, expired or not. Returns true if one existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Has ==
    /// Returns true if the key holds an unexpired entry.
    ///
    /// Expired entries are removed as a side effect, same as `get`.
    pub fn has(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Clear ==
    /// Drops every entry, live or expired.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Expired Keys ==
    /// Collects the keys whose entries are expired as of `now`.
    pub fn expired_keys(&self, now: Instant) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Remove If Expired ==
    /// Removes `key` only if its entry is still expired as of `now`.
    ///
    /// A key that was overwritten since it was collected keeps its new entry.
    pub fn remove_if_expired(&mut self, key: &str, now: Instant) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now));
        if expired {
            self.entries.remove(key);
        }
        expired
    }

    // == Cleanup Expired ==
    /// Removes every entry expired as of `now` in one pass.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Stats ==
    /// Counts live and expired entries as of `now` without removing anything.
    pub fn stats(&self, now: Instant) -> CacheStats {
        let expired = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count();
        CacheStats::new(self.entries.len() - expired, expired)
    }

    // == Time To Live ==
    /// Remaining lifetime of a live entry; `None` if missing or expired.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }

    // == Length ==
    /// Returns the number of stored entries, including unswept expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    // == Peek ==
    /// Probes a key without removing anything.
    pub fn peek(&self, key: &str) -> Lookup<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => Lookup::Expired,
            Some(entry) => Lookup::Hit(entry.value.clone()),
            None => Lookup::Missing,
        }
    }
}
