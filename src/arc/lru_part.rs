//! The recency half of ARC: owns T1 (resident) and B1 (ghost).

use super::ghost::GhostList;
use crate::lru::LruSegment;
use crate::meta::AccessMeta;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

pub(super) struct ArcLruPart<K, V, S> {
    main: LruSegment<K, V, AccessMeta, S>,
    ghost: GhostList<K, S>,
    transform_threshold: u64,
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher + Default> ArcLruPart<K, V, S> {
    /// `capacity` is the full ARC capacity `c`: T1's physical backing store
    /// is sized for the case where the adaptive target `p` reaches `c`, even
    /// though day-to-day occupancy is kept at the current target by the
    /// caller. The ghost list is always sized `c`.
    pub(super) fn new(capacity: NonZeroUsize, transform_threshold: u64) -> Self {
        Self {
            main: LruSegment::new(capacity),
            ghost: GhostList::new(capacity),
            transform_threshold,
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> ArcLruPart<K, V, S> {
    #[inline]
    pub(super) fn len(&self) -> usize {
        self.main.len()
    }

    /// Returns `(value, should_transform)` on a hit. Does not itself move
    /// the entry into the LFU part; the caller decides based on
    /// `should_transform`.
    pub(super) fn get(&mut self, key: &K) -> Option<(V, bool)> {
        let threshold = self.transform_threshold;
        self.main.get_with(key, |meta| {
            meta.count += 1;
            meta.count >= threshold
        })
    }

    /// Detaches `key` from the main list (used when promoting it to the
    /// LFU part); no ghost entry is created, since this isn't a capacity
    /// eviction.
    pub(super) fn take(&mut self, key: &K) -> Option<V> {
        self.main.take(key).map(|(value, _)| value)
    }

    /// Inserts or updates `key`. When inserting a new key and the part is
    /// already at `target`, evicts the oldest entry into the ghost list
    /// first. Under the one-unit-per-ghost-hit invariant the part is never
    /// more than one entry over `target`, so at most one eviction occurs.
    pub(super) fn put(&mut self, key: K, value: V, target: usize) -> Option<(K, V)> {
        if self.main.peek(&key).is_some() {
            return self.main.put_with_metadata(key, value, AccessMeta::new());
        }
        let evicted = self.evict_to_ghost(target);
        self.main.put_with_metadata(key, value, AccessMeta::new());
        evicted
    }

    /// Evicts down to `target`, pushing the victim (if any) to the ghost
    /// list. Used both by `put` and by the top-level `p` shift.
    pub(super) fn evict_to_ghost(&mut self, target: usize) -> Option<(K, V)> {
        if self.main.len() < target {
            return None;
        }
        let (key, value, _) = self.main.evict_oldest()?;
        self.ghost.push(key.clone());
        Some((key, value))
    }

    pub(super) fn ghost_remove(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    pub(super) fn clear(&mut self) {
        self.main.clear();
        self.ghost.clear();
    }
}

impl<K, V, S> core::fmt::Debug for ArcLruPart<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArcLruPart").field("len", &self.main.len()).finish()
    }
}
