#![doc = include_str!("../README.md")]
#![no_std]

/// Unified cache entry type.
///
/// `CacheEntry<K, V, M>` holds a key, value, and a policy-specific metadata
/// slot `M`, so the intrusive list and hash index code backing every engine
/// is written once and reused across policies: `M = ()` for LRU and LRU-K,
/// a frequency counter for LFU, and ARC's own metadata for its sub-parts.
pub mod entry;

/// Policy-specific metadata types stored in a [`CacheEntry`]'s `M` slot.
pub mod meta;

/// Doubly linked list with in-place splice operations.
///
/// Internal infrastructure shared by every engine that needs recency or
/// frequency ordering. Exposes unsafe raw-pointer operations and is not
/// meant to be used directly; see the cache types themselves.
pub(crate) mod list;

/// Cache configuration structures, one per policy, each validated at
/// construction.
pub mod config;

/// The error type returned by constructors and by `remove` on engines that
/// choose to surface a missing key.
pub mod error;

/// The observation hook used to learn about cache lifecycle events.
pub mod observer;

/// The trait every cache type in this crate implements.
pub mod policy;

/// Least Recently Used (LRU) cache.
pub mod lru;

/// LRU-K cache: admission gated by a history of prior accesses.
pub mod lru_k;

/// Least Frequently Used (LFU) cache with aging.
pub mod lfu;

/// Adaptive Replacement Cache (ARC): adapts between recency and frequency.
pub mod arc;

/// Sharded wrapper that partitions keys across independent cache instances.
pub mod sharded;

pub use arc::ArcCache;
pub use entry::CacheEntry;
pub use error::CacheError;
pub use lfu::LfuCache;
pub use lru::LruCache;
pub use lru_k::LruKCache;
pub use observer::{CacheObserver, NullObserver};
pub use policy::CachePolicy;
pub use sharded::ShardedCache;
