//! Integration tests exercising every cache from multiple threads.
//!
//! Each cache wraps its whole engine behind one mutex, so there is no
//! per-segment ordering to reason about here (unlike the sharded wrapper,
//! where each shard's ordering is independent): these tests check that
//! concurrent access never panics, never loses entries beyond what a
//! shared-capacity cache must evict, and that `len()` never exceeds the
//! configured capacity at any observation point.

use cachecore::config::{ArcConfig, LfuConfig, LruConfig, LruKConfig, ShardedConfig};
use cachecore::{ArcCache, CachePolicy, LfuCache, LruCache, LruKCache, ShardedCache};
use core::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 8;
const OPS_PER_THREAD: usize = 2_000;

#[test]
fn concurrent_lru_never_exceeds_capacity() {
    let cache = Arc::new(LruCache::new(LruConfig::new(NonZeroUsize::new(64).unwrap())));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (t * OPS_PER_THREAD + i) as i32;
                    cache.put(key, key);
                    cache.get(&key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 64);
}

#[test]
fn concurrent_lfu_never_exceeds_capacity() {
    let cache = Arc::new(LfuCache::new(LfuConfig::new(NonZeroUsize::new(64).unwrap())));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (t * OPS_PER_THREAD + i) as i32 % 200;
                    cache.put(key, key);
                    cache.get(&key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 64);
}

#[test]
fn concurrent_lru_k_never_exceeds_capacity() {
    let config = LruKConfig::new(
        NonZeroUsize::new(32).unwrap(),
        NonZeroUsize::new(256).unwrap(),
        NonZeroUsize::new(2).unwrap(),
    );
    let cache = Arc::new(LruKCache::new(config));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (t * OPS_PER_THREAD + i) as i32 % 100;
                    cache.put(key, key);
                    cache.get(&key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 32);
}

#[test]
fn concurrent_arc_keeps_t1_plus_t2_within_capacity() {
    let config = ArcConfig::new(NonZeroUsize::new(48).unwrap(), 2).unwrap();
    let cache = Arc::new(ArcCache::new(config));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (t * OPS_PER_THREAD + i) as i32 % 150;
                    cache.put(key, key);
                    cache.get(&key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 48, "ARC-P1 must hold even under concurrent access");
}

#[test]
fn concurrent_sharded_cache_distributes_across_shards() {
    let config = ShardedConfig::new(NonZeroUsize::new(512).unwrap(), NonZeroUsize::new(16).unwrap());
    let cache = Arc::new(ShardedCache::new(config, |cap| LruCache::new(LruConfig::new(cap))));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (t * OPS_PER_THREAD + i) as i32;
                    cache.put(key, key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 512 + 16, "per-shard rounding may overshoot slightly");
}

#[test]
fn purge_from_one_thread_is_observed_by_others() {
    let cache = Arc::new(LruCache::new(LruConfig::new(NonZeroUsize::new(16).unwrap())));
    for i in 0..16 {
        cache.put(i, i);
    }

    let purger = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.purge())
    };
    purger.join().unwrap();

    assert_eq!(cache.len(), 0);
}
