//! Key-only ghost list shared by [`super::lru_part::ArcLruPart`] and
//! [`super::lfu_part::ArcLfuPart`].
//!
//! A ghost list remembers which keys were recently evicted without keeping
//! their values: per the resolved open question in the ARC engine's design,
//! a ghost hit can never itself produce a value, only trigger adaptation.

extern crate alloc;

use crate::list::{List, ListEntry};
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
extern crate std;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

pub(super) struct GhostList<K, S> {
    list: List<K>,
    map: HashMap<K, *mut ListEntry<K>, S>,
}

// SAFETY: GhostList owns every node its raw pointers reference through
// `list`; no pointer escapes its own methods.
unsafe impl<K: Send, S: Send> Send for GhostList<K, S> {}
unsafe impl<K: Send, S: Sync> Sync for GhostList<K, S> {}

impl<K: Hash + Eq + Clone, S: BuildHasher + Default> GhostList<K, S> {
    pub(super) fn new(cap: NonZeroUsize) -> Self {
        Self {
            list: List::new(cap),
            map: HashMap::with_capacity_and_hasher(cap.get(), S::default()),
        }
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> GhostList<K, S> {
    #[inline]
    pub(super) fn len(&self) -> usize {
        self.map.len()
    }

    /// Detaches `key` from the ghost list if present, consuming the ghost
    /// record. A ghost entry is observed at most once.
    pub(super) fn remove(&mut self, key: &K) -> bool {
        let Some(node) = self.map.remove(key) else {
            return false;
        };
        // SAFETY: node came from `self.map` and belongs to `self.list`.
        unsafe {
            self.list.remove(node);
        }
        true
    }

    /// Inserts `key`, evicting the oldest ghost if the list is full.
    pub(super) fn push(&mut self, key: K) {
        if self.map.contains_key(&key) {
            return;
        }
        if self.map.len() >= self.list.cap().get() {
            if let Some(boxed) = self.list.remove_last() {
                // SAFETY: `remove_last` never returns sigil nodes.
                let evicted = unsafe { boxed.into_value() };
                self.map.remove(&evicted);
            }
        }
        if let Some(node) = self.list.add(key.clone()) {
            self.map.insert(key, node);
        }
    }

    pub(super) fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }
}

impl<K, S> core::fmt::Debug for GhostList<K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GhostList").field("len", &self.map.len()).finish()
    }
}
