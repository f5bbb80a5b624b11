//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry: key, value and optional absolute expiry.
///
/// The key is kept alongside the value so that evicting from the back of the
/// recency list can also clear the index.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The key this entry is stored under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Absolute expiry instant, None = never expires
    pub expires_at: Option<Instant>,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructors ==
    /// Creates an entry that never expires.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            expires_at: None,
        }
    }

    /// Creates an entry that expires `ttl_secs` seconds after `now`.
    ///
    /// A TTL of zero or less yields an entry that is already expired at `now`.
    /// A TTL too large to represent as an `Instant` is treated as no expiry.
    pub fn with_ttl(key: K, value: V, ttl_secs: i64, now: Instant) -> Self {
        let expires_at = if ttl_secs <= 0 {
            Some(now)
        } else {
            now.checked_add(Duration::from_secs(ttl_secs as u64))
        };

        Self {
            key,
            value,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry whose expiry equals `now` is expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks if the entry has expired as of the current instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }
}
