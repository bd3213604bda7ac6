//! Least Frequently Used (LFU) cache with aging.
//!
//! Entries are grouped into buckets by access count. A bucket's nodes are
//! kept in recency order (oldest-evicted-first) so that ties at the same
//! frequency fall back to LRU. Pure frequency counting left unchecked lets
//! entries that were hot long ago outlive their usefulness; this engine
//! ages frequencies down whenever the running average crosses a configured
//! ceiling, so stale hot entries eventually become evictable again.
//!
//! [`LfuSegment`] is the unsynchronized engine; [`LfuCache`] is the public,
//! thread-safe wrapper most callers want.

extern crate alloc;

use crate::config::LfuConfig;
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::list::{List, ListEntry};
use crate::meta::LfuMeta;
use crate::observer::{CacheObserver, NullObserver};
use crate::policy::CachePolicy;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
extern crate std;
#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

use parking_lot::Mutex;

type Bucket<K, V> = List<CacheEntry<K, V, LfuMeta>>;

/// Unsynchronized LFU engine.
pub(crate) struct LfuSegment<K, V, S = DefaultHashBuilder> {
    cap: NonZeroUsize,
    max_avg: u64,
    min_freq: u64,
    cur_total: u64,
    map: HashMap<K, *mut ListEntry<CacheEntry<K, V, LfuMeta>>, S>,
    buckets: BTreeMap<u64, Bucket<K, V>>,
}

// SAFETY: LfuSegment owns every node its raw pointers reference through
// `buckets`; no pointer escapes the segment's own methods.
unsafe impl<K: Send, V: Send, S: Send> Send for LfuSegment<K, V, S> {}
// SAFETY: all mutation requires `&mut self`, so shared references cannot
// observe a torn state.
unsafe impl<K: Send, V: Send, S: Sync> Sync for LfuSegment<K, V, S> {}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher + Default> LfuSegment<K, V, S> {
    pub(crate) fn new(config: LfuConfig) -> Self {
        Self {
            cap: config.capacity(),
            max_avg: config.max_avg(),
            min_freq: 1,
            cur_total: 0,
            map: HashMap::with_capacity_and_hasher(config.capacity().get(), S::default()),
            buckets: BTreeMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> LfuSegment<K, V, S> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Records one more access, aging the whole segment down if the running
    /// average now exceeds `max_avg`.
    fn record_access(&mut self) {
        self.cur_total += 1;
        let avg = self.cur_total / self.len().max(1) as u64;
        if avg > self.max_avg {
            self.age();
        }
    }

    /// Subtracts `max_avg / 2` from every resident frequency (floored at 1),
    /// rebuilds the bucket map, and recomputes `min_freq`.
    fn age(&mut self) {
        let shift = (self.max_avg / 2).max(1);
        let old_buckets = mem::replace(&mut self.buckets, BTreeMap::new());
        let mut new_buckets: BTreeMap<u64, Bucket<K, V>> = BTreeMap::new();

        for (freq, mut bucket) in old_buckets {
            let new_freq = freq.saturating_sub(shift).max(1);
            while let Some(boxed) = bucket.remove_first() {
                let ptr = Box::into_raw(boxed);
                // SAFETY: ptr was just detached from `bucket` and not yet
                // reattached anywhere.
                unsafe {
                    (*ptr).get_value_mut().metadata.frequency = new_freq;
                }
                let target = new_buckets
                    .entry(new_freq)
                    .or_insert_with(|| List::new(self.cap));
                // SAFETY: ptr is a freshly detached node, not part of any list.
                unsafe { target.attach_from_other_list(ptr) };
            }
        }

        self.buckets = new_buckets;
        self.min_freq = self.buckets.keys().next().copied().unwrap_or(1);
    }

    /// Moves `node` (currently at `old_freq`) to bucket `old_freq + 1`,
    /// updating `min_freq` if its old bucket is now empty. Returns the same
    /// pointer (the node's address never changes).
    fn bump_frequency(
        &mut self,
        node: *mut ListEntry<CacheEntry<K, V, LfuMeta>>,
        old_freq: u64,
    ) -> *mut ListEntry<CacheEntry<K, V, LfuMeta>> {
        // SAFETY: node is a live entry in the bucket at `old_freq`.
        let boxed = unsafe { self.buckets.get_mut(&old_freq).unwrap().remove(node).unwrap() };
        if self.buckets.get(&old_freq).unwrap().is_empty() && old_freq == self.min_freq {
            self.min_freq = old_freq + 1;
        }

        let new_freq = old_freq + 1;
        let ptr = Box::into_raw(boxed);
        // SAFETY: ptr was just detached and not yet reattached.
        unsafe {
            (*ptr).get_value_mut().metadata.frequency = new_freq;
        }
        let bucket = self
            .buckets
            .entry(new_freq)
            .or_insert_with(|| List::new(self.cap));
        // SAFETY: ptr is a freshly detached node, not part of any list.
        unsafe { bucket.attach_from_other_list(ptr) };
        ptr
    }

    /// Looks up `key`, bumping its frequency on a hit.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = *self.map.get(key)?;
        // SAFETY: node came from `self.map` and is live in `self.buckets`.
        let old_freq = unsafe { (*node).get_value().metadata.frequency };
        let new_node = self.bump_frequency(node, old_freq);
        self.record_access();
        // SAFETY: new_node is the same live node, now at its new frequency.
        Some(unsafe { (*new_node).get_value().value.clone() })
    }

    /// Inserts or updates `key`. An update bumps frequency like a hit. A
    /// fresh insert at capacity evicts the oldest entry in the `min_freq`
    /// bucket and enters at frequency 1.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&node) = self.map.get(&key) {
            // SAFETY: node came from `self.map`.
            let old_freq = unsafe { (*node).get_value().metadata.frequency };
            let new_node = self.bump_frequency(node, old_freq);
            // SAFETY: new_node is the same live node.
            unsafe {
                (*new_node).get_value_mut().value = value;
            }
            self.record_access();
            return None;
        }

        let mut evicted = None;
        if self.map.len() >= self.cap.get() {
            if let Some(boxed) = self
                .buckets
                .get_mut(&self.min_freq)
                .and_then(|bucket| bucket.remove_last())
            {
                let ptr = Box::into_raw(boxed);
                // SAFETY: ptr was just detached and is dropped right after
                // its contents are copied out.
                unsafe {
                    let old_entry = (*ptr).get_value();
                    evicted = Some((old_entry.key.clone(), old_entry.value.clone()));
                    self.cur_total = self
                        .cur_total
                        .saturating_sub(old_entry.metadata.frequency);
                    self.map.remove(&old_entry.key);
                    drop(Box::from_raw(ptr));
                }
            }
        }

        let bucket = self.buckets.entry(1).or_insert_with(|| List::new(self.cap));
        let cache_entry = CacheEntry::with_metadata(key.clone(), value, LfuMeta::new());
        if let Some(node) = bucket.add(cache_entry) {
            self.map.insert(key, node);
        }
        self.min_freq = 1;
        self.record_access();

        evicted
    }

    /// Removes `key`, returning its value if present.
    pub(crate) fn take<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        // SAFETY: node came from `self.map` and is live in `self.buckets`.
        let freq = unsafe { (*node).get_value().metadata.frequency };
        let bucket = self.buckets.get_mut(&freq)?;
        // SAFETY: node is a live entry of `bucket`.
        let boxed = unsafe { bucket.remove(node) }?;
        let now_empty = bucket.is_empty();

        if now_empty && freq == self.min_freq {
            self.min_freq = self
                .buckets
                .keys()
                .find(|&&f| f > freq && !self.buckets.get(&f).map(Bucket::is_empty).unwrap_or(true))
                .copied()
                .unwrap_or(1);
        }

        // SAFETY: `remove` never returns sigil nodes.
        let entry = unsafe { boxed.into_value() };
        Some(entry.value)
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.buckets.clear();
        self.min_freq = 1;
        self.cur_total = 0;
    }
}

impl<K, V, S> core::fmt::Debug for LfuSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LfuSegment")
            .field("capacity", &self.cap)
            .field("len", &self.map.len())
            .field("min_freq", &self.min_freq)
            .finish()
    }
}

/// A thread-safe LFU cache with aging.
///
/// On absence, [`CachePolicy::remove`] is a no-op success rather than
/// `Err(CacheError::NotFound)`: a key that ages or evicts out from under a
/// racing `remove` call is a routine outcome, not an error.
///
/// # Examples
///
/// ```
/// use cachecore::{CachePolicy, LfuCache, config::LfuConfig};
/// use core::num::NonZeroUsize;
///
/// let cache = LfuCache::new(LfuConfig::new(NonZeroUsize::new(2).unwrap()));
/// cache.put(1, "A");
/// cache.put(2, "B");
/// cache.get(&1); // bump "A"'s frequency above "B"'s
/// cache.put(3, "C"); // evicts "B", the lower-frequency entry
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&1), Some("A"));
/// ```
pub struct LfuCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<LfuSegment<K, V, S>>,
    observer: Arc<dyn CacheObserver<K, V>>,
}

impl<K, V, S> core::fmt::Debug for LfuCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LfuCache").finish_non_exhaustive()
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher + Default> LfuCache<K, V, S> {
    /// Creates a new LFU cache from `config`.
    pub fn new(config: LfuConfig) -> Self
    where
        K: 'static,
        V: 'static,
    {
        Self::with_observer(config, Arc::new(NullObserver))
    }

    /// Creates a new LFU cache that reports events to `observer`.
    pub fn with_observer(config: LfuConfig, observer: Arc<dyn CacheObserver<K, V>>) -> Self {
        Self {
            segment: Mutex::new(LfuSegment::new(config)),
            observer,
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> CachePolicy<K, V> for LfuCache<K, V, S> {
    fn put(&self, key: K, value: V) {
        let mut segment = self.segment.lock();
        self.observer.on_insert(&key);
        if let Some((evicted_key, evicted_value)) = segment.put(key, value) {
            self.observer.on_evict(&evicted_key, &evicted_value);
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        let mut segment = self.segment.lock();
        match segment.get(key) {
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
        let mut segment = self.segment.lock();
        if let Some(value) = segment.take(key) {
            self.observer.on_evict(key, &value);
        }
        Ok(())
    }

    fn purge(&self) {
        let mut segment = self.segment.lock();
        segment.clear();
        self.observer.on_purge();
    }

    fn len(&self) -> usize {
        self.segment.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(cap: usize) -> LfuCache<i32, &'static str> {
        LfuCache::new(LfuConfig::new(NonZeroUsize::new(cap).unwrap()))
    }

    #[test]
    fn seed_lfu_frequency_eviction() {
        // capacity=2; put(1,"A"); put(2,"B"); get(1) bumps 1's frequency;
        // put(3,"C") evicts 2, the lower-frequency resident.
        let cache = cache(2);
        cache.put(1, "A");
        cache.put(2, "B");
        assert_eq!(cache.get(&1), Some("A"));
        cache.put(3, "C");
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some("A"));
        assert_eq!(cache.get(&3), Some("C"));
    }

    #[test]
    fn lfu_p1_lower_frequency_evicted_first() {
        let cache = cache(2);
        cache.put(1, "A");
        cache.put(2, "B");
        cache.get(&2);
        cache.get(&2);
        cache.put(3, "C"); // 1 has the lowest frequency
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("B"));
    }

    #[test]
    fn lfu_p2_tie_breaks_by_recency() {
        let cache = cache(2);
        cache.put(1, "A");
        cache.put(2, "B"); // both at frequency 1; 1 is older
        cache.put(3, "C"); // evicts 1, the least-recently-inserted at freq 1
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("B"));
        assert_eq!(cache.get(&3), Some("C"));
    }

    #[test]
    fn update_existing_key_bumps_frequency_and_value() {
        let cache = cache(2);
        cache.put(1, "A");
        cache.put(1, "B"); // counts as an access: frequency now 2
        cache.put(2, "C");
        cache.put(3, "D"); // evicts 2, lower frequency than 1
        assert_eq!(cache.get(&1), Some("B"));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn remove_on_absent_key_is_ok() {
        let cache = cache(2);
        assert_eq!(cache.remove(&1), Ok(()));
    }

    #[test]
    fn remove_present_key_drops_it() {
        let cache = cache(2);
        cache.put(1, "A");
        assert_eq!(cache.remove(&1), Ok(()));
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn aging_lets_a_cold_entry_reclaim_its_slot() {
        let config = LfuConfig::with_max_avg(NonZeroUsize::new(2).unwrap(), 2).unwrap();
        let cache = LfuCache::new(config);
        cache.put(1, "A");
        cache.put(2, "B");
        // Drive 1's frequency far above 2's, then push the average over the
        // ceiling so aging brings both back within reach of eviction.
        for _ in 0..10 {
            cache.get(&1);
        }
        cache.put(3, "C");
        // 2 still has the lowest post-aging frequency among survivors.
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn p5_purge_resets_to_initial_state() {
        let cache = cache(4);
        cache.put(1, "A");
        cache.put(2, "B");
        cache.purge();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), None);
    }
}
