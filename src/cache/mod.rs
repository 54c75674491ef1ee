//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and single-flight loading.

use std::time::Duration;

mod entry;
mod flight;
mod stats;
mod store;


// Re-export public types
pub use entry::{is_expired_at, CacheEntry};
pub use flight::{Flight, FlightGuard, FlightRegistry};
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup};

// == Public Constants ==
/// Longest lifetime an entry can have; longer TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60); // ~100 years
