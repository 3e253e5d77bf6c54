//! Cache error types.

use thiserror::Error;

/// Errors raised while configuring a cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A cache was configured to hold no entries.
    #[error("cache tier '{tier}' must hold at least one entry")]
    ZeroCapacity {
        /// Name of the misconfigured tier.
        tier: &'static str,
    },
}

/// Result type for cache construction.
pub type CacheResult<T> = Result<T, CacheError>;
