//! Policy-specific metadata types stored alongside entries via
//! `CacheEntry<K, V, M>`'s `M` parameter.

/// Frequency-bucket metadata used by the LFU engine and by ARC's LFU part.
///
/// `frequency` is the access count that currently determines which
/// frequency bucket the entry lives in; it is kept in sync with the bucket
/// the entry is physically attached to by whichever engine owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LfuMeta {
    /// Current access count / frequency bucket key.
    pub frequency: u64,
}

impl LfuMeta {
    /// Metadata for a freshly inserted entry: frequency 1.
    #[inline]
    pub fn new() -> Self {
        LfuMeta { frequency: 1 }
    }
}

/// Per-entry access counter used by ARC's LRU part to decide when an entry
/// has earned promotion into the LFU part (`shouldTransform`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessMeta {
    /// Number of times this entry has been accessed since it entered the
    /// LRU part (reset when a fresh entry is created, never decremented).
    pub count: u64,
}

impl AccessMeta {
    /// Metadata for a freshly inserted entry.
    #[inline]
    pub fn new() -> Self {
        AccessMeta { count: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lfu_meta_starts_at_one() {
        assert_eq!(LfuMeta::new().frequency, 1);
    }

    #[test]
    fn access_meta_starts_at_zero() {
        assert_eq!(AccessMeta::new().count, 0);
    }
}
