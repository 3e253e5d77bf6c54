//! # Cache Tiers
//!
//! Each world scale owns one independently sized tier.
//!
//! ```text
//!   request(key) ──► CacheTier ──lock──► LruCache ── hit ──► Arc<V>
//!                        │
//!                        └── miss ──► pending slot ──► generate() ──► insert + evict
//!                                          ▲
//!                   concurrent miss ───────┘ (waits, no second generation)
//! ```

mod lru;
mod stats;
mod tier;

pub use lru::{CacheEntry, LruCache};
pub use stats::CacheStats;
pub use tier::CacheTier;
