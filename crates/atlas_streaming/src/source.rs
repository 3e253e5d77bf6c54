//! # Generation Source
//!
//! The scheduler does not call the generators directly. It goes through
//! [`WorldSource`], which [`Generators`] implements:
//!
//! ```text
//! atlas_streaming defines:    atlas_procedural implements:
//! ┌──────────────────┐        ┌──────────────────────┐
//! │ trait WorldSource│ ←───── │ impl for Generators  │
//! └──────────────────┘        └──────────────────────┘
//! ```

use atlas_procedural::{
    BlockCoord, BlockData, ChunkCoord, ChunkData, GenResult, Generators, SectorCoord, SectorData, WorldShape,
};

/// Stateless producer of world data at all three scales.
///
/// Implementations must be deterministic: the same arguments always give
/// the same result, from any thread.
pub trait WorldSource: Send + Sync + 'static {
    /// Size of the finite World grid.
    fn shape(&self) -> &WorldShape;

    /// Generates a sector.
    ///
    /// # Errors
    ///
    /// Fails if `coord` lies outside the World grid.
    fn generate_sector(&self, coord: SectorCoord) -> GenResult<SectorData>;

    /// Generates a block from its parent sector.
    ///
    /// # Errors
    ///
    /// Fails if `parent` does not contain `coord`.
    fn generate_block(&self, parent: &SectorData, coord: BlockCoord) -> GenResult<BlockData>;

    /// Generates a chunk from its parent block.
    ///
    /// # Errors
    ///
    /// Fails if `parent` does not contain `coord`.
    fn generate_chunk(&self, parent: &BlockData, coord: ChunkCoord) -> GenResult<ChunkData>;
}

impl WorldSource for Generators {
    fn shape(&self) -> &WorldShape {
        &self.config().world
    }

    fn generate_sector(&self, coord: SectorCoord) -> GenResult<SectorData> {
        self.world().generate_sector(coord)
    }

    fn generate_block(&self, parent: &SectorData, coord: BlockCoord) -> GenResult<BlockData> {
        self.regional().generate_block(parent, coord)
    }

    fn generate_chunk(&self, parent: &BlockData, coord: ChunkCoord) -> GenResult<ChunkData> {
        self.local().generate_chunk(parent, coord)
    }
}
