//! Error types returned by cache constructors and by `remove` on engines that
//! choose to surface a missing key.
//!
//! Every other operation reports hit/miss through `Option`, never through
//! this type; see the crate-level docs for the propagation policy.

extern crate alloc;

use alloc::string::String;
use thiserror::Error;

/// Errors produced by this crate.
///
/// There are exactly two kinds: a rejected construction argument and a
/// missing key on an explicit `remove`. Anything else (a list link that is
/// unexpectedly null, an invariant violated by a bug) is a programmer error
/// and panics rather than returning a value.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CacheError {
    /// A constructor argument was zero, negative, or otherwise out of range.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable explanation of which argument was rejected and why.
        message: String,
    },

    /// `remove(key)` was called for a key not present in the cache.
    #[error("key not found")]
    NotFound,
}

impl CacheError {
    /// Builds an [`CacheError::InvalidArgument`] from a static message.
    pub(crate) fn invalid_argument(message: &'static str) -> Self {
        CacheError::InvalidArgument {
            message: String::from(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_carries_message() {
        let err = CacheError::invalid_argument("capacity must be non-zero");
        match err {
            CacheError::InvalidArgument { message } => {
                assert_eq!(message, "capacity must be non-zero");
            }
            CacheError::NotFound => panic!("wrong variant"),
        }
    }

    #[test]
    fn not_found_is_distinct_from_invalid_argument() {
        assert_ne!(
            CacheError::NotFound,
            CacheError::invalid_argument("capacity must be non-zero")
        );
    }
}
