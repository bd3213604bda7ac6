//! Least Recently Used (LRU) cache.
//!
//! # How it works
//!
//! ```text
//! HashMap<K, *Node>          Doubly-linked list
//! ┌──────────────┐          ┌──────────────────────────────┐
//! │ "apple"  ───────────────▶ MRU ◀──▶ ... ◀──▶ LRU         │
//! │ "banana" ───────────────▶  ▲                    │       │
//! └──────────────┘             └────────── head  tail───────┘
//! ```
//!
//! The map gives O(1) lookup to a list node; the list encodes recency, with
//! the tail-neighbor as most-recently-used and the head-neighbor as least.
//! `get` moves the accessed node adjacent to the tail; `put` does the same
//! on update, or evicts the head-neighbor before inserting at the tail when
//! the cache is full.
//!
//! [`LruSegment`] is the unsynchronized engine, generic over a metadata type
//! `M` so [`crate::arc`]'s LRU part can reuse it with its own per-entry
//! access counter. [`LruCache`] is the public, thread-safe wrapper most
//! callers want: it guards one `LruSegment<K, V, (), S>` behind a mutex.

extern crate alloc;

use crate::config::LruConfig;
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::list::{List, ListEntry};
use crate::observer::{CacheObserver, NullObserver};
use crate::policy::CachePolicy;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

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

use core::num::NonZeroUsize;
use parking_lot::Mutex;

/// Unsynchronized LRU engine, generic over per-entry metadata `M`.
///
/// Reused by [`crate::arc::ArcLruPart`] with `M = `[`crate::meta::AccessMeta`];
/// [`LruCache`] uses `M = ()`.
pub(crate) struct LruSegment<K, V, M = (), S = DefaultHashBuilder> {
    cap: NonZeroUsize,
    list: List<CacheEntry<K, V, M>>,
    map: HashMap<K, *mut ListEntry<CacheEntry<K, V, M>>, S>,
}

// SAFETY: LruSegment owns every node its raw pointers reference through
// `list`; no pointer escapes the segment's own methods.
unsafe impl<K: Send, V: Send, M: Send, S: Send> Send for LruSegment<K, V, M, S> {}
// SAFETY: all mutation requires `&mut self`, so shared references cannot
// observe a torn state.
unsafe impl<K: Send, V: Send, M: Send, S: Sync> Sync for LruSegment<K, V, M, S> {}

impl<K: Hash + Eq + Clone, V, M, S: BuildHasher + Default> LruSegment<K, V, M, S> {
    pub(crate) fn new(cap: NonZeroUsize) -> Self {
        Self {
            cap,
            list: List::new(cap),
            map: HashMap::with_capacity_and_hasher(cap.get(), S::default()),
        }
    }
}

impl<K: Hash + Eq + Clone, V, M, S: BuildHasher> LruSegment<K, V, M, S> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Looks up `key` without promoting it; used by ARC to peek at a key it
    /// is about to remove from this part.
    pub(crate) fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = *self.map.get(key)?;
        // SAFETY: node came from `self.map` and is live as long as the key
        // remains present in the map.
        Some(unsafe { &(*node).get_value().value })
    }

    /// Looks up `key`, moving it to the most-recently-used position and
    /// running `on_touch` against its metadata. Returns the value and
    /// whatever `on_touch` returns.
    pub(crate) fn get_with<Q, R>(
        &mut self,
        key: &Q,
        on_touch: impl FnOnce(&mut M) -> R,
    ) -> Option<(V, R)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let node = *self.map.get(key)?;
        // SAFETY: node came from `self.map` and belongs to `self.list`.
        unsafe {
            self.list.move_to_front(node);
            let entry = (*node).get_value_mut();
            let result = on_touch(&mut entry.metadata);
            Some((entry.value.clone(), result))
        }
    }

    /// Inserts or overwrites `key`, attaching fresh metadata `metadata` on
    /// insert (an update keeps the existing metadata untouched). Returns the
    /// evicted `(key, value)` if eviction occurred.
    pub(crate) fn put_with_metadata(&mut self, key: K, value: V, metadata: M) -> Option<(K, V)>
    where
        V: Clone,
    {
        if let Some(&node) = self.map.get(&key) {
            // SAFETY: node came from `self.map`.
            unsafe {
                self.list.move_to_front(node);
                (*node).get_value_mut().value = value;
            }
            return None;
        }

        let mut evicted = None;
        if self.map.len() >= self.cap.get() {
            if let Some(old_node) = self.list.remove_last() {
                let old_node = Box::into_raw(old_node);
                // SAFETY: old_node was just detached from the list and not
                // yet freed; reading its value is valid before the
                // subsequent `Box::from_raw` drops it.
                unsafe {
                    let old_entry = (*old_node).get_value();
                    self.map.remove(&old_entry.key);
                    evicted = Some((old_entry.key.clone(), old_entry.value.clone()));
                    drop(Box::from_raw(old_node));
                }
            }
        }

        let cache_entry = CacheEntry::with_metadata(key.clone(), value, metadata);
        if let Some(node) = self.list.add(cache_entry) {
            self.map.insert(key, node);
        }
        evicted
    }

    /// Evicts and returns the least-recently-used entry, if any.
    ///
    /// Used by [`crate::arc::ArcLruPart`], which enforces its own adaptive
    /// logical capacity rather than this segment's fixed physical one and so
    /// must be able to evict ahead of a `put_with_metadata` call.
    pub(crate) fn evict_oldest(&mut self) -> Option<(K, V, M)> {
        let boxed = self.list.remove_last()?;
        // SAFETY: `remove_last` never returns sigil nodes.
        let entry = unsafe { boxed.into_value() };
        self.map.remove(&entry.key);
        Some((entry.key, entry.value, entry.metadata))
    }

    /// Removes `key`, returning its value and metadata if present.
    pub(crate) fn take<Q>(&mut self, key: &Q) -> Option<(V, M)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        // SAFETY: node was in `self.map`, so it is a live node in `self.list`.
        let boxed = unsafe { self.list.remove(node) }?;
        // SAFETY: `remove` never returns sigil nodes; `boxed` is a regular
        // node just detached from the list.
        let entry = unsafe { boxed.into_value() };
        Some((entry.value, entry.metadata))
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }
}

impl<K, V, M, S> core::fmt::Debug for LruSegment<K, V, M, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruSegment")
            .field("capacity", &self.cap)
            .field("len", &self.map.len())
            .finish()
    }
}

/// A thread-safe Least Recently Used cache.
///
/// # Examples
///
/// ```
/// use cachecore::{LruCache, config::LruConfig};
/// use core::num::NonZeroUsize;
///
/// let cache = LruCache::new(LruConfig::new(NonZeroUsize::new(2).unwrap()));
/// cache.put(1, "A");
/// cache.put(2, "B");
/// cache.put(3, "C");
///
/// assert_eq!(cache.get(&1), None);       // evicted
/// assert_eq!(cache.get(&2), Some("B"));
/// assert_eq!(cache.get(&3), Some("C"));
/// ```
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<LruSegment<K, V, (), S>>,
    observer: Arc<dyn CacheObserver<K, V>>,
}

impl<K, V, S> core::fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruCache").finish_non_exhaustive()
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher + Default> LruCache<K, V, S> {
    /// Creates a new LRU cache from `config`.
    pub fn new(config: LruConfig) -> Self
    where
        K: 'static,
        V: 'static,
    {
        Self::with_observer(config, Arc::new(NullObserver))
    }

    /// Creates a new LRU cache that reports events to `observer`.
    pub fn with_observer(config: LruConfig, observer: Arc<dyn CacheObserver<K, V>>) -> Self {
        Self {
            segment: Mutex::new(LruSegment::new(config.capacity())),
            observer,
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> CachePolicy<K, V> for LruCache<K, V, S> {
    fn put(&self, key: K, value: V) {
        let mut segment = self.segment.lock();
        let evicted = segment.put_with_metadata(key.clone(), value, ());
        self.observer.on_insert(&key);
        if let Some((evicted_key, evicted_value)) = evicted {
            self.observer.on_evict(&evicted_key, &evicted_value);
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        let mut segment = self.segment.lock();
        match segment.get_with(key, |_| ()) {
            Some((value, ())) => {
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
        match segment.take(key) {
            Some((value, ())) => {
                self.observer.on_evict(key, &value);
                Ok(())
            }
            None => Err(CacheError::NotFound),
        }
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
    use crate::config::LruConfig;

    fn cache(cap: usize) -> LruCache<i32, &'static str> {
        LruCache::new(LruConfig::new(NonZeroUsize::new(cap).unwrap()))
    }

    #[test]
    fn seed_lru_eviction() {
        let cache = cache(2);
        cache.put(1, "A");
        cache.put(2, "B");
        cache.put(3, "C");
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("B"));
        assert_eq!(cache.get(&3), Some("C"));
    }

    #[test]
    fn seed_lru_promotion() {
        let cache = cache(2);
        cache.put(1, "A");
        cache.put(2, "B");
        assert_eq!(cache.get(&1), Some("A"));
        cache.put(3, "C");
        assert_eq!(cache.get(&1), Some("A"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some("C"));
    }

    #[test]
    fn p3_put_then_get_returns_same_value() {
        let cache = cache(4);
        cache.put(1, "A");
        assert_eq!(cache.get(&1), Some("A"));
    }

    #[test]
    fn p4_put_twice_then_get_returns_latest() {
        let cache = cache(4);
        cache.put(1, "A");
        cache.put(1, "B");
        assert_eq!(cache.get(&1), Some("B"));
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

    #[test]
    fn lru_p1_older_untouched_key_evicted_first() {
        let cache = cache(2);
        cache.put(1, "A");
        cache.put(2, "B");
        cache.put(3, "C");
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("B"));
    }

    #[test]
    fn lru_p2_hit_protects_from_next_eviction() {
        let cache = cache(2);
        cache.put(1, "A");
        cache.put(2, "B");
        assert_eq!(cache.get(&1), Some("A"));
        cache.put(3, "C");
        assert_eq!(cache.get(&1), Some("A"));
    }

    #[test]
    fn remove_present_key_succeeds() {
        let cache = cache(4);
        cache.put(1, "A");
        assert!(cache.remove(&1).is_ok());
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn remove_absent_key_is_not_found() {
        let cache = cache(4);
        assert_eq!(cache.remove(&1), Err(CacheError::NotFound));
    }
}
