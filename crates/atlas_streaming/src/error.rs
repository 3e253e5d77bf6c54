//! # Streaming Error Types
//!
//! Wraps the lower crates' errors so the scheduler has one error type at
//! its boundary.

use atlas_core::CacheError;
use atlas_procedural::{ConfigError, GenError, ScaleCoord};
use thiserror::Error;

/// Errors surfaced by the scheduler.
#[derive(Error, Debug)]
pub enum StreamError {
    /// A generator rejected the request.
    #[error(transparent)]
    Generation(#[from] GenError),

    /// A cache tier could not be built.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A worker thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The scheduler was shut down.
    #[error("scheduler is shut down")]
    ShutDown,

    /// Generating this coordinate panicked on the calling thread.
    #[error("generation of {job:?} panicked")]
    WorkerPanicked {
        /// Coordinate that was being generated.
        job: ScaleCoord,
    },
}

impl StreamError {
    /// Returns true if retrying the same request cannot succeed.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Cache(_) | Self::Config(_) | Self::ShutDown)
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
