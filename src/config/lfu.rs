//! Configuration for the LFU engine.

use crate::error::CacheError;
use core::num::NonZeroUsize;

/// Default aging ceiling when the caller does not supply one: chosen large
/// enough that aging is effectively disabled for typical workloads unless
/// the caller opts in with a tighter value.
pub const DEFAULT_MAX_AVG: u64 = u64::MAX / 2;

/// Configuration for an LFU cache: capacity and an aging ceiling `max_avg`.
///
/// `max_avg` must be at least 1 if supplied explicitly; the default
/// ([`DEFAULT_MAX_AVG`]) is large enough that aging practically never
/// triggers unless the caller asks for it.
///
/// # Examples
///
/// ```
/// use cachecore::config::LfuConfig;
/// use core::num::NonZeroUsize;
///
/// let config = LfuConfig::new(NonZeroUsize::new(100).unwrap());
/// let aging = LfuConfig::with_max_avg(NonZeroUsize::new(100).unwrap(), 8).unwrap();
/// assert_eq!(aging.max_avg(), 8);
/// assert!(LfuConfig::with_max_avg(NonZeroUsize::new(100).unwrap(), 0).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LfuConfig {
    capacity: NonZeroUsize,
    max_avg: u64,
}

impl LfuConfig {
    /// Creates a new LFU configuration with the default aging ceiling.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            max_avg: DEFAULT_MAX_AVG,
        }
    }

    /// Creates a new LFU configuration with an explicit aging ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] if `max_avg` is zero.
    pub fn with_max_avg(capacity: NonZeroUsize, max_avg: u64) -> Result<Self, CacheError> {
        if max_avg == 0 {
            return Err(CacheError::invalid_argument("max_avg must be at least 1"));
        }
        Ok(Self { capacity, max_avg })
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Aging ceiling: once `curTotal / size` exceeds this, aging runs.
    pub fn max_avg(&self) -> u64 {
        self.max_avg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_large_ceiling() {
        let config = LfuConfig::new(NonZeroUsize::new(10).unwrap());
        assert_eq!(config.max_avg(), DEFAULT_MAX_AVG);
    }

    #[test]
    fn zero_max_avg_is_rejected() {
        assert!(LfuConfig::with_max_avg(NonZeroUsize::new(10).unwrap(), 0).is_err());
    }

    #[test]
    fn explicit_max_avg_is_stored() {
        let config = LfuConfig::with_max_avg(NonZeroUsize::new(10).unwrap(), 5).unwrap();
        assert_eq!(config.max_avg(), 5);
    }
}
