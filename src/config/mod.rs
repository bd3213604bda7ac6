//! Per-policy configuration structs.
//!
//! Each cache is built from its own configuration type, validated at
//! construction so that invalid arguments (non-positive capacity, K, or
//! shard count) are rejected before any state is allocated.
//!
//! # Examples
//!
//! ```
//! use cachecore::config::LruConfig;
//! use core::num::NonZeroUsize;
//!
//! let config = LruConfig::new(NonZeroUsize::new(100).unwrap());
//! assert_eq!(config.capacity().get(), 100);
//! ```

pub mod arc;
pub mod lfu;
pub mod lru;
pub mod lru_k;
pub mod sharded;

pub use arc::ArcConfig;
pub use lfu::LfuConfig;
pub use lru::LruConfig;
pub use lru_k::LruKConfig;
pub use sharded::ShardedConfig;
