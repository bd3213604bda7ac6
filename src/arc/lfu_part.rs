//! The frequency half of ARC: owns T2 (resident) and B2 (ghost).
//!
//! Structurally this mirrors [`crate::lfu::LfuSegment`]: frequency buckets
//! in a `BTreeMap`, a `min_freq` watermark kept eagerly correct, but without
//! the aging mechanism, since ARC's own adaptive `p` already handles the
//! role aging plays for plain LFU.

extern crate alloc;

use super::ghost::GhostList;
use crate::entry::CacheEntry;
use crate::list::{List, ListEntry};
use crate::meta::LfuMeta;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;
#[cfg(not(feature = "hashbrown"))]
extern crate std;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

type Bucket<K, V> = List<CacheEntry<K, V, LfuMeta>>;

pub(super) struct ArcLfuPart<K, V, S> {
    cap: NonZeroUsize,
    min_freq: u64,
    map: HashMap<K, *mut ListEntry<CacheEntry<K, V, LfuMeta>>, S>,
    buckets: BTreeMap<u64, Bucket<K, V>>,
    ghost: GhostList<K, S>,
}

// SAFETY: same reasoning as `LfuSegment`: all raw pointers are owned through
// `buckets` and never escape this struct's own methods.
unsafe impl<K: Send, V: Send, S: Send> Send for ArcLfuPart<K, V, S> {}
unsafe impl<K: Send, V: Send, S: Sync> Sync for ArcLfuPart<K, V, S> {}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher + Default> ArcLfuPart<K, V, S> {
    /// `capacity` is the full ARC capacity `c`, mirroring
    /// [`super::lru_part::ArcLruPart::new`]'s reasoning.
    pub(super) fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cap: capacity,
            min_freq: 1,
            map: HashMap::with_capacity_and_hasher(capacity.get(), S::default()),
            buckets: BTreeMap::new(),
            ghost: GhostList::new(capacity),
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> ArcLfuPart<K, V, S> {
    #[inline]
    pub(super) fn len(&self) -> usize {
        self.map.len()
    }

    pub(super) fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn bump_frequency(
        &mut self,
        node: *mut ListEntry<CacheEntry<K, V, LfuMeta>>,
        old_freq: u64,
    ) -> *mut ListEntry<CacheEntry<K, V, LfuMeta>> {
        let boxed = unsafe { self.buckets.get_mut(&old_freq).unwrap().remove(node).unwrap() };
        if self.buckets.get(&old_freq).unwrap().is_empty() && old_freq == self.min_freq {
            self.min_freq = old_freq + 1;
        }
        let new_freq = old_freq + 1;
        let ptr = Box::into_raw(boxed);
        // SAFETY: ptr was just boxed from a node this struct owns.
        unsafe {
            (*ptr).get_value_mut().metadata.frequency = new_freq;
        }
        let bucket = self.buckets.entry(new_freq).or_insert_with(|| List::new(self.cap));
        unsafe { bucket.attach_from_other_list(ptr) };
        ptr
    }

    pub(super) fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = *self.map.get(key)?;
        // SAFETY: node came from `self.map`.
        let old_freq = unsafe { (*node).get_value().metadata.frequency };
        let new_node = self.bump_frequency(node, old_freq);
        Some(unsafe { (*new_node).get_value().value.clone() })
    }

    /// Evicts down to `target`, pushing the victim (if any) to the ghost
    /// list.
    pub(super) fn evict_to_ghost(&mut self, target: usize) -> Option<(K, V)> {
        if self.map.len() < target {
            return None;
        }
        let boxed = self.buckets.get_mut(&self.min_freq)?.remove_last()?;
        let ptr = Box::into_raw(boxed);
        // SAFETY: ptr was just detached from its bucket and not yet freed.
        let (key, value) = unsafe {
            let entry = (*ptr).get_value();
            let pair = (entry.key.clone(), entry.value.clone());
            self.map.remove(&entry.key);
            drop(Box::from_raw(ptr));
            pair
        };
        if self.buckets.get(&self.min_freq).map(Bucket::is_empty).unwrap_or(true) {
            self.min_freq = self
                .buckets
                .keys()
                .find(|&&f| !self.buckets.get(&f).map(Bucket::is_empty).unwrap_or(true))
                .copied()
                .unwrap_or(1);
        }
        self.ghost.push(key.clone());
        Some((key, value))
    }

    /// Inserts or updates `key`. When inserting a new key and the part is
    /// already at `target`, evicts the minimum-frequency entry first.
    pub(super) fn put(&mut self, key: K, value: V, target: usize) -> Option<(K, V)> {
        if let Some(&node) = self.map.get(&key) {
            let old_freq = unsafe { (*node).get_value().metadata.frequency };
            let new_node = self.bump_frequency(node, old_freq);
            unsafe { (*new_node).get_value_mut().value = value };
            return None;
        }
        let evicted = self.evict_to_ghost(target);
        let bucket = self.buckets.entry(1).or_insert_with(|| List::new(self.cap));
        let cache_entry = CacheEntry::with_metadata(key.clone(), value, LfuMeta::new());
        if let Some(node) = bucket.add(cache_entry) {
            self.map.insert(key, node);
        }
        self.min_freq = 1;
        evicted
    }

    pub(super) fn take(&mut self, key: &K) -> Option<V> {
        let node = self.map.remove(key)?;
        // SAFETY: node came from `self.map`.
        let freq = unsafe { (*node).get_value().metadata.frequency };
        let bucket = self.buckets.get_mut(&freq)?;
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
        let entry = unsafe { boxed.into_value() };
        Some(entry.value)
    }

    pub(super) fn ghost_remove(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    pub(super) fn clear(&mut self) {
        self.map.clear();
        self.buckets.clear();
        self.min_freq = 1;
        self.ghost.clear();
    }
}

impl<K, V, S> core::fmt::Debug for ArcLfuPart<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArcLfuPart").field("len", &self.map.len()).finish()
    }
}
