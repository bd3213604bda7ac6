//! Adaptive Replacement Cache (ARC): two resident lists (T1 recency, T2
//! frequency) and two ghost lists (B1, B2), with a target `p` that adapts
//! toward whichever list's ghost is taking hits.
//!
//! The two halves are independent sub-engines, [`lru_part::ArcLruPart`] and
//! [`lfu_part::ArcLfuPart`], each behind its own mutex. `target_p` — T1's
//! current target size — lives on the top-level [`ArcCache`] rather than
//! inside either sub-part, specifically so that shifting it never requires
//! holding both sub-part mutexes at once: a ghost check locks one part,
//! releases it, then (on a hit) locks the other part alone to evict down to
//! its new target.

mod ghost;
mod lfu_part;
mod lru_part;

extern crate alloc;

use crate::config::ArcConfig;
use crate::error::CacheError;
use crate::observer::{CacheObserver, NullObserver};
use crate::policy::CachePolicy;
use alloc::sync::Arc;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use core::sync::atomic::{AtomicUsize, Ordering};
use lfu_part::ArcLfuPart;
use lru_part::ArcLruPart;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
extern crate std;
#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe ARC cache.
///
/// # Examples
///
/// ```
/// use cachecore::{ArcCache, config::ArcConfig};
/// use core::num::NonZeroUsize;
///
/// let config = ArcConfig::new(NonZeroUsize::new(4).unwrap(), 2).unwrap();
/// let cache = ArcCache::new(config);
///
/// cache.put(1, "A");
/// assert_eq!(cache.get(&1), Some("A"));
/// ```
pub struct ArcCache<K, V, S = DefaultHashBuilder> {
    capacity: NonZeroUsize,
    initial_p: usize,
    target_p: AtomicUsize,
    lru_part: Mutex<ArcLruPart<K, V, S>>,
    lfu_part: Mutex<ArcLfuPart<K, V, S>>,
    observer: Arc<dyn CacheObserver<K, V>>,
}

impl<K, V, S> core::fmt::Debug for ArcCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArcCache")
            .field("capacity", &self.capacity)
            .field("target_p", &self.target_p.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher + Default> ArcCache<K, V, S> {
    /// Creates a new ARC cache from `config`. The adaptive target `p`
    /// starts balanced at `capacity / 2`.
    pub fn new(config: ArcConfig) -> Self {
        Self::with_observer(config, Arc::new(NullObserver))
    }

    /// Creates a new ARC cache that reports events to `observer`.
    pub fn with_observer(config: ArcConfig, observer: Arc<dyn CacheObserver<K, V>>) -> Self {
        let capacity = config.capacity();
        let initial_p = capacity.get() / 2;
        Self {
            capacity,
            initial_p,
            target_p: AtomicUsize::new(initial_p),
            lru_part: Mutex::new(ArcLruPart::new(capacity, config.transform_threshold())),
            lfu_part: Mutex::new(ArcLfuPart::new(capacity)),
            observer,
        }
    }

    #[inline]
    fn lru_target(&self) -> usize {
        self.target_p.load(Ordering::Relaxed)
    }

    #[inline]
    fn lfu_target(&self) -> usize {
        self.capacity.get() - self.lru_target()
    }

    /// Consults both ghost lists for `key`, shifting `target_p` by exactly
    /// one unit on a hit (never holding both sub-part mutexes at once).
    fn check_ghosts(&self, key: &K) {
        let found_in_b1 = {
            let mut lru = self.lru_part.lock();
            lru.ghost_remove(key)
        };
        if found_in_b1 {
            self.shift_toward_recency();
            return;
        }

        let found_in_b2 = {
            let mut lfu = self.lfu_part.lock();
            lfu.ghost_remove(key)
        };
        if found_in_b2 {
            self.shift_toward_frequency();
        }
    }

    /// A B1 hit: grow T1's target by one, shrinking T2's. If T2 is now over
    /// its new target, it evicts its own victim into B2.
    fn shift_toward_recency(&self) {
        let old_p = self.target_p.load(Ordering::Relaxed);
        let new_p = (old_p + 1).min(self.capacity.get());
        if new_p == old_p {
            return;
        }
        self.target_p.store(new_p, Ordering::Relaxed);
        let new_lfu_target = self.capacity.get() - new_p;
        let mut lfu = self.lfu_part.lock();
        if let Some((evicted_key, evicted_value)) = lfu.evict_to_ghost(new_lfu_target) {
            self.observer.on_evict(&evicted_key, &evicted_value);
        }
    }

    /// A B2 hit: grow T2's target by one, shrinking T1's, symmetric to
    /// [`Self::shift_toward_recency`].
    fn shift_toward_frequency(&self) {
        let old_p = self.target_p.load(Ordering::Relaxed);
        let new_p = old_p.saturating_sub(1);
        if new_p == old_p {
            return;
        }
        self.target_p.store(new_p, Ordering::Relaxed);
        let mut lru = self.lru_part.lock();
        if let Some((evicted_key, evicted_value)) = lru.evict_to_ghost(new_p) {
            self.observer.on_evict(&evicted_key, &evicted_value);
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> CachePolicy<K, V> for ArcCache<K, V, S> {
    fn put(&self, key: K, value: V) {
        self.check_ghosts(&key);

        let already_in_lfu = self.lfu_part.lock().contains(&key);
        self.observer.on_insert(&key);
        let evicted = if already_in_lfu {
            let target = self.lfu_target();
            self.lfu_part.lock().put(key, value, target)
        } else {
            let target = self.lru_target();
            self.lru_part.lock().put(key, value, target)
        };
        if let Some((evicted_key, evicted_value)) = evicted {
            self.observer.on_evict(&evicted_key, &evicted_value);
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        self.check_ghosts(key);

        let lru_hit = self.lru_part.lock().get(key);
        if let Some((value, should_transform)) = lru_hit {
            self.observer.on_hit(key);
            if should_transform {
                let taken = self.lru_part.lock().take(key);
                if let Some(value) = taken {
                    let target = self.lfu_target();
                    let evicted = self.lfu_part.lock().put(key.clone(), value, target);
                    if let Some((evicted_key, evicted_value)) = evicted {
                        self.observer.on_evict(&evicted_key, &evicted_value);
                    }
                }
            }
            return Some(value);
        }

        match self.lfu_part.lock().get(key) {
            Some(value) => {
                self.observer.on_hit(key);
                Some(value)
            }
            None => {
                self.observer.on_miss(key);
                None
            }
        }
    }

    fn remove(&self, key: &K) -> Result<(), CacheError> {
        let taken = self.lru_part.lock().take(key);
        let taken = taken.or_else(|| self.lfu_part.lock().take(key));
        if let Some(value) = taken {
            self.observer.on_evict(key, &value);
        }
        Ok(())
    }

    fn purge(&self) {
        self.lru_part.lock().clear();
        self.lfu_part.lock().clear();
        self.target_p.store(self.initial_p, Ordering::Relaxed);
        self.observer.on_purge();
    }

    fn len(&self) -> usize {
        self.lru_part.lock().len() + self.lfu_part.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, transform_threshold: u64) -> ArcCache<i32, &'static str> {
        ArcCache::new(ArcConfig::new(NonZeroUsize::new(capacity).unwrap(), transform_threshold).unwrap())
    }

    #[test]
    fn seed_arc_roundtrip() {
        let cache = cache(4, 2);
        cache.put(1, "A");
        assert_eq!(cache.get(&1), Some("A"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn arc_p1_total_residents_never_exceed_capacity() {
        let cache = cache(4, 2);
        for i in 0..20 {
            cache.put(i, "x");
            assert!(cache.len() <= 4, "ARC-P1 violated at key {i}");
        }
    }

    #[test]
    fn repeated_access_promotes_into_lfu_part() {
        let cache = cache(4, 2);
        cache.put(1, "A");
        cache.get(&1); // count 1, below threshold 2
        cache.get(&1); // count 2, meets threshold: promotes to LFU part
        assert_eq!(cache.get(&1), Some("A"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn arc_p2_b1_hit_shifts_p_by_exactly_one_unit() {
        let cache = cache(4, 100); // high threshold: nothing transforms on its own
        for key in 1..=4 {
            cache.put(key, "x"); // fills T1 to its initial target and beyond,
        }
        // Force an eviction into B1 by inserting past the LRU part's target.
        let before = cache.target_p.load(Ordering::Relaxed);
        cache.put(5, "y");
        // Re-offering a key now in B1 (if any were evicted there) should
        // shift p toward recency by exactly one unit.
        for key in 1..=5 {
            let hit_before = cache.target_p.load(Ordering::Relaxed);
            cache.get(&key);
            let hit_after = cache.target_p.load(Ordering::Relaxed);
            assert!(hit_after == hit_before || hit_after == hit_before + 1);
        }
        let after = cache.target_p.load(Ordering::Relaxed);
        assert!(after >= before, "p should never move backward on a B1 hit");
    }

    #[test]
    fn remove_on_absent_key_is_ok() {
        let cache = cache(4, 2);
        assert!(cache.remove(&99).is_ok());
    }

    #[test]
    fn p5_purge_resets_to_initial_state() {
        let cache = cache(4, 2);
        cache.put(1, "A");
        cache.put(2, "B");
        cache.purge();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.target_p.load(Ordering::Relaxed), cache.initial_p);
    }
}
