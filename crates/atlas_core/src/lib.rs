//! # ATLAS Core
//!
//! Bounded, thread-safe caches for generated world data.
//!
//! ## Architecture Rules
//!
//! 1. **Strict LRU** - Eviction follows access sequence numbers, oldest first
//! 2. **One lock per tier** - Tiers never contend with each other
//! 3. **No duplicate work** - Concurrent misses on one key share a single generation
//!
//! ## Example
//!
//! ```rust,ignore
//! use atlas_core::CacheTier;
//!
//! let tier: CacheTier<(i64, i64), String> = CacheTier::new("local", 64)?;
//! let value = tier.get_or_insert((0, 0), || Ok::<_, ()>("origin".to_string()))?;
//! assert_eq!(value.as_str(), "origin");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod error;

pub use cache::{CacheEntry, CacheStats, CacheTier, LruCache};
pub use error::{CacheError, CacheResult};
