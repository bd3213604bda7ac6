//! The contract every cache in this crate implements.
//!
//! Application code written against [`CachePolicy`] can switch the
//! underlying eviction policy (LRU, LRU-K, LFU, ARC, or a sharded wrapper
//! around any of them) without structural changes.

use crate::error::CacheError;

/// Operations common to every replacement-policy engine.
///
/// Values are returned by clone rather than by reference: every
/// implementation guards its state with an internal mutex (see the
/// crate-level concurrency docs), and a borrow that outlived the mutex
/// guard would not be sound.
pub trait CachePolicy<K, V> {
    /// Inserts a new key or updates an existing one. Never fails: capacity
    /// is enforced by eviction, not by rejecting the call.
    fn put(&self, key: K, value: V);

    /// Looks up `key`, applying the policy's access side effects on a hit.
    /// Returns `None` on a miss with no structural change, except as
    /// documented per policy (e.g. LRU-K's history bookkeeping).
    fn get(&self, key: &K) -> Option<V>;

    /// Removes `key` if present. Engines that choose to surface absence
    /// return `Err(CacheError::NotFound)`; engines where "absent" is a
    /// routine outcome of their own eviction bookkeeping (LFU, ARC) treat a
    /// missing key as a no-op success. See each engine's module docs for
    /// which behavior it implements.
    fn remove(&self, key: &K) -> Result<(), CacheError>;

    /// Drops all entries, preserving capacity configuration.
    fn purge(&self);

    /// Current number of resident entries.
    fn len(&self) -> usize;

    /// True if no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
