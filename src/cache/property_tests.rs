//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a straightforward model and to
//! hammer the shared cache from several threads.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use crate::cache::{CacheStore, LruCache};

// == Strategies ==
/// Small key space so that sequences revisit keys often
fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..16
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: u8, value: u32 },
    Get { key: u8 },
    Del { key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Del { key }),
    ]
}

// == Reference Model ==
/// Obviously-correct LRU: a vector kept most recent first.
struct ModelLru {
    capacity: usize,
    items: Vec<(u8, u32)>,
}

impl ModelLru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    fn set(&mut self, key: u8, value: u32) {
        self.items.retain(|(k, _)| *k != key);
        self.items.insert(0, (key, value));
        self.items.truncate(self.capacity);
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let pos = self.items.iter().position(|(k, _)| *k == key)?;
        let item = self.items.remove(pos);
        self.items.insert(0, item);
        Some(item.1)
    }

    fn del(&mut self, key: u8) {
        self.items.retain(|(k, _)| *k != key);
    }

    fn keys(&self) -> Vec<u8> {
        self.items.iter().map(|(k, _)| *k).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Every operation agrees with the model, including full recency order.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let mut store = CacheStore::new(capacity).unwrap();
        let mut model = ModelLru::new(capacity);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key, value);
                    model.set(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(key));
                }
                CacheOp::Del { key } => {
                    store.del(&key);
                    model.del(key);
                }
            }
            prop_assert_eq!(store.keys(), model.keys());
            store.assert_consistent();
        }
    }

    // The size never exceeds capacity after any set.
    #[test]
    fn prop_capacity_bound(
        capacity in 1usize..20,
        entries in prop::collection::vec((any::<u16>(), any::<u32>(), -2i64..3), 1..200)
    ) {
        let mut store = CacheStore::new(capacity).unwrap();

        for (key, value, ttl) in entries {
            if ttl == 2 {
                store.set(key, value);
            } else {
                store.set_with_ttl(key, value, ttl);
            }
            prop_assert!(
                store.len() <= capacity,
                "Cache size {} exceeds capacity {}",
                store.len(),
                capacity
            );
        }
        store.assert_consistent();
    }

    // Filling to capacity and adding one more evicts exactly the first key.
    #[test]
    fn prop_eviction_order(capacity in 1usize..32) {
        let mut store = CacheStore::new(capacity).unwrap();

        for key in 0..=capacity {
            store.set(key, key);
        }

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(!store.contains(&0));
        for key in 1..=capacity {
            prop_assert!(store.contains(&key), "key {} should survive", key);
        }
        prop_assert_eq!(store.stats().evictions, 1);
    }

    // A read protects the oldest key; the next oldest goes instead.
    #[test]
    fn prop_read_promotes(capacity in 2usize..32) {
        let mut store = CacheStore::new(capacity).unwrap();

        for key in 0..capacity {
            store.set(key, key);
        }
        prop_assert_eq!(store.get(&0), Some(0));
        store.set(capacity, capacity);

        prop_assert!(store.contains(&0));
        prop_assert!(!store.contains(&1));
    }

    // Overwriting keeps one entry and returns the latest value.
    #[test]
    fn prop_overwrite_semantics(key in any::<u32>(), v1 in any::<u64>(), v2 in any::<u64>()) {
        let mut store = CacheStore::new(8).unwrap();

        store.set(key, v1);
        store.set(key, v2);

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.get(&key), Some(v2));
    }

    // Non-positive TTLs are never visible.
    #[test]
    fn prop_non_positive_ttl_is_expired(key in any::<u32>(), ttl in i64::MIN..=0) {
        let mut store = CacheStore::new(4).unwrap();

        store.set_with_ttl(key, "v", ttl);
        prop_assert!(!store.contains(&key));
        prop_assert_eq!(store.get(&key), None);
        prop_assert!(store.is_empty());
    }
}

// == Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Each thread owns a disjoint slice of the key space and capacity covers
    // all keys, so the final state is fixed by each thread's own last write
    // no matter how the threads interleave.
    #[test]
    fn prop_concurrent_matches_per_thread_replay(
        scripts in prop::collection::vec(
            prop::collection::vec(cache_op_strategy(), 1..200),
            2..6
        )
    ) {
        let threads = scripts.len();
        let cache = Arc::new(LruCache::new(threads * 16).unwrap());

        let handles: Vec<_> = scripts
            .iter()
            .cloned()
            .enumerate()
            .map(|(t, script)| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let base = (t * 16) as u32;
                    for op in script {
                        match op {
                            CacheOp::Set { key, value } => cache.set(base + key as u32, value),
                            CacheOp::Get { key } => {
                                cache.get(&(base + key as u32));
                            }
                            CacheOp::Del { key } => cache.del(&(base + key as u32)),
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            prop_assert!(handle.join().is_ok(), "worker panicked");
        }

        // Single-threaded oracle replay of each script
        let mut expected: HashMap<u32, u32> = HashMap::new();
        for (t, script) in scripts.iter().enumerate() {
            let base = (t * 16) as u32;
            for op in script {
                match op {
                    CacheOp::Set { key, value } => {
                        expected.insert(base + *key as u32, *value);
                    }
                    CacheOp::Del { key } => {
                        expected.remove(&(base + *key as u32));
                    }
                    CacheOp::Get { .. } => {}
                }
            }
        }

        cache.assert_consistent();
        prop_assert_eq!(cache.len(), expected.len());
        for (key, value) in expected {
            prop_assert_eq!(cache.peek(&key), Some(value));
        }
    }

    // Heavy contention on a tiny cache never breaks the bound or the index.
    #[test]
    fn prop_concurrent_small_capacity(
        capacity in 1usize..6,
        scripts in prop::collection::vec(
            prop::collection::vec(cache_op_strategy(), 50..200),
            2..8
        )
    ) {
        let cache = Arc::new(LruCache::new(capacity).unwrap());

        let handles: Vec<_> = scripts
            .into_iter()
            .map(|script| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for op in script {
                        match op {
                            CacheOp::Set { key, value } if value % 2 == 0 => {
                                cache.set_with_ttl(key, value, (value % 3) as i64 - 1)
                            }
                            CacheOp::Set { key, value } => cache.set(key, value),
                            CacheOp::Get { key } => {
                                cache.get(&key);
                            }
                            CacheOp::Del { key } => cache.del(&key),
                        }
                        assert!(cache.len() <= capacity);
                    }
                })
            })
            .collect();

        for handle in handles {
            prop_assert!(handle.join().is_ok(), "worker panicked");
        }

        cache.assert_consistent();
        prop_assert!(cache.len() <= capacity);
    }
}
