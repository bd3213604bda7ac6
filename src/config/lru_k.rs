//! Configuration for the LRU-K engine.

use core::num::NonZeroUsize;

/// Configuration for an LRU-K cache: main capacity, history capacity, and
/// the admission threshold `k`.
///
/// All three parameters are `NonZeroUsize`: capacity, history capacity, and
/// `k` must each be greater than zero.
///
/// # Examples
///
/// ```
/// use cachecore::config::LruKConfig;
/// use core::num::NonZeroUsize;
///
/// let config = LruKConfig::new(
///     NonZeroUsize::new(100).unwrap(),
///     NonZeroUsize::new(500).unwrap(),
///     NonZeroUsize::new(2).unwrap(),
/// );
/// assert_eq!(config.k().get(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LruKConfig {
    capacity: NonZeroUsize,
    history_capacity: NonZeroUsize,
    k: NonZeroUsize,
}

impl LruKConfig {
    /// Creates a new LRU-K configuration.
    pub fn new(capacity: NonZeroUsize, history_capacity: NonZeroUsize, k: NonZeroUsize) -> Self {
        Self {
            capacity,
            history_capacity,
            k,
        }
    }

    /// Capacity of the main (admitted) cache.
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Capacity of the history sub-cache.
    pub fn history_capacity(&self) -> NonZeroUsize {
        self.history_capacity
    }

    /// Number of accesses required before a key is admitted to the main cache.
    pub fn k(&self) -> NonZeroUsize {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_all_fields() {
        let config = LruKConfig::new(
            NonZeroUsize::new(10).unwrap(),
            NonZeroUsize::new(50).unwrap(),
            NonZeroUsize::new(3).unwrap(),
        );
        assert_eq!(config.capacity().get(), 10);
        assert_eq!(config.history_capacity().get(), 50);
        assert_eq!(config.k().get(), 3);
    }
}
