//! Cache Entry Module
//!
//! Defines individual cache entries and the expiry policy shared by reads and sweeps.

use std::time::Duration;

use tokio::time::Instant;

use crate::cache::MAX_TTL;

// == Expiry Policy ==
/// Returns true once `now` has reached `expires_at`.
///
/// Boundary condition: an entry is expired when the current time is greater
/// than or equal to its expiration time, so a zero TTL expires immediately.
#[inline]
pub fn is_expired_at(expires_at: Instant, now: Instant) -> bool {
    now >= expires_at
}

// == Cache Entry ==
/// A single cached value with its absolute expiration time.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was stored
    pub created_at: Instant,
    /// When the entry stops being visible to reads
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` from now.
    ///
    /// TTLs longer than [`MAX_TTL`] are clamped, so any `Duration` is accepted.
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl.min(MAX_TTL),
        }
    }

    // == Is Expired ==
    /// Checks the entry against the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks the entry against a caller-supplied instant.
    ///
    /// Scans use one instant for every entry so a snapshot is consistent.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        is_expired_at(self.expires_at, now)
    }

    // == Time To Live ==
    /// Returns remaining lifetime, or `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(60));

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.expires_at - entry.created_at, Duration::from_secs(60));
        assert!(!entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(1));

        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert!(entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(entry.ttl_remaining(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining_expired() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(2)).await;

        // Saturates instead of underflowing
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ttl_is_clamped() {
        let entry = CacheEntry::new("forever", Duration::MAX);

        assert_eq!(entry.expires_at - entry.created_at, MAX_TTL);
        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(entry.ttl_remaining(), MAX_TTL - Duration::from_secs(3600));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(1u32, Duration::ZERO);
        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();

        assert!(is_expired_at(now, now), "Entry should be expired at boundary");
        assert!(!is_expired_at(now + Duration::from_millis(1), now));
        assert!(is_expired_at(now, now + Duration::from_millis(1)));
    }
}
