//! Cache Store Module
//!
//! Single-threaded cache engine combining a key index with the recency list
//! and lazy TTL expiration. Thread safety is layered on top by [`LruCache`].
//!
//! [`LruCache`]: crate::cache::LruCache

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, RecencyList};
use crate::error::{Error, Result};

// == Cache Store ==
/// Capacity-bounded map with LRU eviction and TTL support.
///
/// `index` maps every live key to its handle in `order`, and `order` holds
/// exactly the entries named by `index`. Both are always updated together.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key -> handle into the recency list
    index: HashMap<K, usize>,
    /// Entries, most recently touched first
    order: RecencyList<CacheEntry<K, V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty store holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns `Error::InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }

        Ok(Self {
            index: HashMap::with_capacity(capacity),
            order: RecencyList::with_capacity(capacity),
            stats: CacheStats::new(capacity),
            capacity,
        })
    }

    // == Set ==
    /// Stores a key-value pair that never expires.
    ///
    /// An existing entry is replaced wholesale, which also clears any TTL it
    /// carried. The key becomes the most recently used.
    pub fn set(&mut self, key: K, value: V) {
        self.insert(CacheEntry::new(key, value));
    }

    // == Set With TTL ==
    /// Stores a key-value pair that expires `ttl_secs` seconds from now.
    ///
    /// A TTL of zero or less stores an entry that is already expired: the next
    /// `get` reports it missing and reclaims it.
    pub fn set_with_ttl(&mut self, key: K, value: V, ttl_secs: i64) {
        self.insert(CacheEntry::with_ttl(key, value, ttl_secs, Instant::now()));
    }

    fn insert(&mut self, entry: CacheEntry<K, V>) {
        match self.index.get(&entry.key) {
            Some(&idx) => {
                if let Some(slot) = self.order.get_mut(idx) {
                    *slot = entry;
                }
                self.order.move_to_front(idx);
            }
            None => {
                let key = entry.key.clone();
                let idx = self.order.push_front(entry);
                self.index.insert(key, idx);
            }
        }

        // At most one pass under normal use; the loop keeps the bound honest
        while self.order.len() > self.capacity {
            if !self.evict_oldest() {
                break;
            }
        }
    }

    // == Get ==
    /// Looks up a key, promoting it to most recently used.
    ///
    /// An expired entry is removed as a side effect and reported as missing.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();

        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let expired = self
            .order
            .get(idx)
            .map_or(true, |entry| entry.is_expired_at(now));

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            trace!("expired entry reclaimed on read");
            return None;
        }

        self.order.move_to_front(idx);
        self.stats.record_hit();
        self.order.get(idx).map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes a key. Missing keys are ignored.
    pub fn del<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key);
    }

    // == Peek ==
    /// Returns the value of a live entry without touching its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_entry(key, Instant::now())
            .map(|entry| &entry.value)
    }

    // == Contains ==
    /// Returns true if the key is present and not expired.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_entry(key, Instant::now()).is_some()
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
        let now = Instant::now();
        self.live_entry(key, now)
            .and_then(|entry| entry.ttl_remaining_at(now))
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<usize> = self
            .order
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(idx, _)| idx)
            .collect();

        let count = expired.len();
        for idx in expired {
            if let Some(entry) = self.order.remove(idx) {
                self.index.remove(&entry.key);
            }
        }

        self.stats.record_expirations(count);
        count
    }

    // == Clear ==
    /// Removes every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    // == Introspection ==
    /// Returns the current number of entries, expired ones included until
    /// they are reclaimed.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the fixed capacity set at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.entries = self.order.len();
        stats
    }

    /// Keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.order
            .iter()
            .map(|(_, entry)| entry.key.clone())
            .collect()
    }

    // == Internal Helpers ==
    fn live_entry<Q>(&self, key: &Q, now: Instant) -> Option<&CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.order
            .get(idx)
            .filter(|entry| !entry.is_expired_at(now))
    }

    fn remove_entry<Q>(&mut self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.order.remove(idx)
    }

    /// Drops the least recently used entry. Returns false if nothing was left.
    fn evict_oldest(&mut self) -> bool {
        match self.order.pop_back() {
            Some(entry) => {
                self.index.remove(&entry.key);
                self.stats.record_eviction();
                trace!(capacity = self.capacity, "evicted least recently used entry");
                true
            }
            None => false,
        }
    }

    /// Panics if the index and the recency list have drifted apart.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert!(self.order.len() <= self.capacity, "size exceeds capacity");
        assert_eq!(self.index.len(), self.order.len(), "index/list size mismatch");

        let mut walked = 0;
        for (idx, entry) in self.order.iter() {
            assert_eq!(
                self.index.get(&entry.key),
                Some(&idx),
                "list node not indexed under its own key"
            );
            walked += 1;
        }
        assert_eq!(walked, self.order.len(), "list walk length mismatch");
    }
}
