//! # ATLAS Streaming
//!
//! Keeps generated world data flowing to a real-time consumer.
//!
//! ## Architecture Rules
//!
//! 1. **Ownership tree** - The scheduler owns the tiers; tiers hold the source
//! 2. **Bounded foreground** - `request` runs one generation chain at most
//! 3. **Budgeted background** - Workers start at most `tick_budget` jobs per tick
//! 4. **Retry by regeneration** - Failures leave keys absent, never poisoned
//!
//! ## Example
//!
//! ```rust,ignore
//! use atlas_streaming::{EngineConfig, Scheduler};
//! use atlas_procedural::{AbsoluteCoord, ChunkCoord, ScaleCoord};
//!
//! let scheduler = Scheduler::new(EngineConfig::default())?;
//!
//! // Every frame
//! scheduler.preload(AbsoluteCoord::new(100, 100), 3);
//! let chunk = scheduler.request(ScaleCoord::Local(ChunkCoord::new(3, 3)))?;
//! scheduler.tick();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod scheduler;
pub mod source;
pub mod tiers;

pub use config::{EngineConfig, StreamingConfig};
pub use error::{StreamError, StreamResult};
pub use scheduler::{Scheduler, SchedulerEvent};
pub use source::WorldSource;
pub use tiers::{WorldData, WorldTiers};
