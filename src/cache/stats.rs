//! Cache Statistics Module
//!
//! Snapshot of how many stored entries are live versus awaiting removal.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of the store, derived by scanning it.
///
/// Nothing here is tracked incrementally; every snapshot is recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries physically present in the store
    pub total: usize,
    /// Entries that reads would still return
    pub active: usize,
    /// Entries past their expiry that have not been removed yet
    pub expired: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a snapshot from live and expired counts.
    pub fn new(active: usize, expired: usize) -> Self {
        Self {
            total: active + expired,
            active,
            expired,
        }
    }

    // == Expired Ratio ==
    /// Fraction of stored entries that are expired, or 0.0 for an empty store.
    pub fn expired_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.expired as f64 / self.total as f64
        }
    }
}
