//! # ATLAS Procedural Generation
//!
//! Deterministic, hierarchical world generation at three scales.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and key always produce the same data
//! 2. **Hierarchical**: Sector → block → chunk, each built from its parent
//! 3. **Consistent**: A child never contradicts what its parent permits
//! 4. **Stateless**: Generators are immutable and safe to share across threads
//!
//! ## Core Components
//!
//! - `SimplexNoise`: Seeded 2D noise with octave composition
//! - `coords`: Scale-aware grid coordinates with floor-division conversions
//! - `WorldGenerator`: Classifies sectors of the finite World grid
//! - `RegionalGenerator`: Refines a sector into blocks
//! - `LocalGenerator`: Produces tile grids and resource clusters for chunks
//! - `verify`: Parent/child consistency checks
//!
//! ## Example
//!
//! ```rust,ignore
//! use atlas_procedural::{ChunkCoord, Generators, WorldSeed};
//!
//! let gens = Generators::with_seed(WorldSeed::new(42));
//! let chunk = gens.chunk(ChunkCoord::new(700, 1300))?;
//! assert_eq!(chunk.tiles().len(), 32 * 32);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod chunk;
pub mod cluster;
pub mod config;
pub mod coords;
pub mod error;
pub mod generators;
pub mod noise;
pub mod sector;
pub mod terrain;
pub mod verify;

#[cfg(test)]
mod test_support;

pub use block::{BlockData, BoundaryMarkers, RegionalGenerator};
pub use chunk::{ChunkData, LocalGenerator, Tile};
pub use cluster::{ClusterField, ClusterPlan, ResourceCluster, ResourceNode};
pub use config::{
    ClimateBands, ElevationBands, GenerationConfig, LocalRules, NoiseLayers, RegionalRules, WorldShape,
};
pub use coords::{
    from_absolute, scale_of, to_absolute, AbsoluteCoord, BlockCoord, ChunkCoord, GridCoord, Scale, ScaleCoord,
    SectorCoord, BLOCKS_PER_SECTOR, BLOCK_TILES, CHUNKS_PER_BLOCK, CHUNK_SIZE, SECTOR_TILES, TILES_PER_CHUNK,
};
pub use error::{ConfigError, ConfigResult, GenError, GenResult};
pub use generators::Generators;
pub use noise::{octave_noise, scalar_noise, NoiseChannel, NoiseLayer, SimplexNoise, WorldSeed};
pub use sector::{SectorData, WorldGenerator, WorldSummary};
pub use terrain::{ClimateZone, Rarity, ResourceKind, TerrainClass, TerrainSubtype, TileTerrain};
pub use verify::{verify_block, verify_chunk, ConsistencyViolation};
