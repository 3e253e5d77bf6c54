//! # Generation Error Types
//!
//! Generation itself is pure arithmetic and cannot fail. What can fail is
//! the request: a sector outside the finite world, or a child asked to
//! build on a parent that does not geometrically contain it.

use std::path::PathBuf;

use thiserror::Error;

use crate::coords::{BlockCoord, ChunkCoord, SectorCoord};

/// Errors raised by the generators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    /// World sector outside the finite world grid.
    #[error("sector ({x}, {y}) is outside the {width}x{height} world grid")]
    OutOfBounds {
        /// Requested sector X.
        x: i64,
        /// Requested sector Y.
        y: i64,
        /// World grid width in sectors.
        width: u32,
        /// World grid height in sectors.
        height: u32,
    },

    /// Regional block requested with a sector that does not contain it.
    #[error("block {block:?} lies in sector {expected:?}, but parent data is for {actual:?}")]
    BlockParentMismatch {
        /// The block being generated.
        block: BlockCoord,
        /// Sector that geometrically contains the block.
        expected: SectorCoord,
        /// Sector of the supplied parent data.
        actual: SectorCoord,
    },

    /// Local chunk requested with a block that does not contain it.
    #[error("chunk {chunk:?} lies in block {expected:?}, but parent data is for {actual:?}")]
    ChunkParentMismatch {
        /// The chunk being generated.
        chunk: ChunkCoord,
        /// Block that geometrically contains the chunk.
        expected: BlockCoord,
        /// Block of the supplied parent data.
        actual: BlockCoord,
    },
}

impl GenError {
    /// Returns true for precondition violations on the parent argument.
    #[must_use]
    pub const fn is_parent_mismatch(&self) -> bool {
        matches!(self, Self::BlockParentMismatch { .. } | Self::ChunkParentMismatch { .. })
    }
}

/// Result type for generation.
pub type GenResult<T> = Result<T, GenError>;

/// Errors raised while loading or validating generation settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The settings text is not valid TOML for the expected schema.
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but violates a constraint.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
