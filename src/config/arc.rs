//! Configuration for the ARC engine.

use crate::error::CacheError;
use core::num::NonZeroUsize;

/// Configuration for an ARC cache: total resident capacity `c` and the
/// promotion threshold `transformThreshold`.
///
/// # Examples
///
/// ```
/// use cachecore::config::ArcConfig;
/// use core::num::NonZeroUsize;
///
/// let config = ArcConfig::new(NonZeroUsize::new(100).unwrap(), 2).unwrap();
/// assert_eq!(config.transform_threshold(), 2);
/// assert!(ArcConfig::new(NonZeroUsize::new(100).unwrap(), 0).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArcConfig {
    capacity: NonZeroUsize,
    transform_threshold: u64,
}

impl ArcConfig {
    /// Creates a new ARC configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] if `transform_threshold` is zero.
    pub fn new(capacity: NonZeroUsize, transform_threshold: u64) -> Result<Self, CacheError> {
        if transform_threshold == 0 {
            return Err(CacheError::invalid_argument(
                "transform_threshold must be at least 1",
            ));
        }
        Ok(Self {
            capacity,
            transform_threshold,
        })
    }

    /// Total resident capacity (|T1| + |T2|).
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Access count at which an LRU-part entry is promoted to the LFU part.
    pub fn transform_threshold(&self) -> u64 {
        self.transform_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threshold_is_rejected() {
        assert!(ArcConfig::new(NonZeroUsize::new(4).unwrap(), 0).is_err());
    }

    #[test]
    fn valid_config_round_trips() {
        let config = ArcConfig::new(NonZeroUsize::new(4).unwrap(), 3).unwrap();
        assert_eq!(config.capacity().get(), 4);
        assert_eq!(config.transform_threshold(), 3);
    }
}
