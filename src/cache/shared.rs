//! Thread-safe LRU cache
//!
//! Wraps [`CacheStore`] in a single `parking_lot::RwLock` so it can be shared
//! between connection tasks behind an `Arc`.

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;

// == LRU Cache ==
/// Concurrent, capacity-bounded LRU cache with optional per-entry TTL.
///
/// The whole cache is one critical section. Anything that can mutate the
/// index or the recency list takes the write lock for the entire operation;
/// that includes `get`, which promotes on a hit and reclaims on expiry.
/// Read-only inspection (`peek`, `contains`, `len`, ...) shares the read lock.
///
/// Values are handed out as clones. Store `Arc<T>` to share large payloads.
///
/// # Example
/// ```
/// use hotcache::LruCache;
///
/// let cache = LruCache::new(2).unwrap();
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.get(&"a");
/// cache.set("c", 3);
///
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some(1));
/// ```
#[derive(Debug)]
pub struct LruCache<K, V> {
    inner: RwLock<CacheStore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns `Error::InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: RwLock::new(CacheStore::new(capacity)?),
        })
    }

    // == Set ==
    /// Inserts or replaces an entry that never expires.
    pub fn set(&self, key: K, value: V) {
        self.inner.write().set(key, value);
    }

    // == Set With TTL ==
    /// Inserts or replaces an entry expiring `ttl_secs` seconds from now.
    ///
    /// Zero or negative TTLs produce an entry that is already expired.
    pub fn set_with_ttl(&self, key: K, value: V, ttl_secs: i64) {
        self.inner.write().set_with_ttl(key, value, ttl_secs);
    }

    // == Get ==
    /// Returns a clone of the live value and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().get(key)
    }

    // == Delete ==
    /// Removes a key if present.
    pub fn del<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().del(key);
    }

    // == Peek ==
    /// Returns a clone of the live value without refreshing its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().peek(key).cloned()
    }

    // == Contains ==
    /// Returns true if the key is present and not expired.
    ///
    /// Neither promotes nor reclaims the entry.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains(key)
    }

    // == Time To Live ==
    /// Remaining lifetime of a live entry that was stored with a TTL.
    ///
    /// Returns None for missing, expired and never-expiring entries.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().ttl_remaining(key)
    }

    // == Purge Expired ==
    /// Removes every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.inner.write().purge_expired()
    }

    // == Clear ==
    /// Removes every entry. Counters are kept.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    // == Introspection ==
    /// Returns the current number of entries, expired ones included until
    /// they are reclaimed.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Returns the fixed capacity set at construction.
    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.inner.read().stats()
    }

    /// Keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().keys()
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.inner.read().assert_consistent();
    }
}
