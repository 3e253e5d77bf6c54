//! # World Tiers
//!
//! One cache tier per scale. A child is always generated from its parent as
//! held by the parent's tier, so a block never sees a different sector than
//! the one other readers of that sector see.

use std::sync::Arc;
use std::time::Duration;

use atlas_core::{CacheStats, CacheTier};
use atlas_procedural::{
    BlockCoord, BlockData, ChunkCoord, ChunkData, GenResult, Scale, ScaleCoord, SectorCoord, SectorData,
};

use crate::config::StreamingConfig;
use crate::error::StreamResult;
use crate::source::WorldSource;

/// Generated data for one coordinate at any scale.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldData {
    /// A World sector.
    Sector(Arc<SectorData>),
    /// A Regional block.
    Block(Arc<BlockData>),
    /// A Local chunk.
    Chunk(Arc<ChunkData>),
}

impl WorldData {
    /// Scale of the data.
    #[must_use]
    pub const fn scale(&self) -> Scale {
        match self {
            Self::Sector(_) => Scale::World,
            Self::Block(_) => Scale::Regional,
            Self::Chunk(_) => Scale::Local,
        }
    }

    /// The sector, if this is World data.
    #[must_use]
    pub fn as_sector(&self) -> Option<&SectorData> {
        match self {
            Self::Sector(s) => Some(s),
            _ => None,
        }
    }

    /// The block, if this is Regional data.
    #[must_use]
    pub fn as_block(&self) -> Option<&BlockData> {
        match self {
            Self::Block(b) => Some(b),
            _ => None,
        }
    }

    /// The chunk, if this is Local data.
    #[must_use]
    pub fn as_chunk(&self) -> Option<&ChunkData> {
        match self {
            Self::Chunk(c) => Some(c),
            _ => None,
        }
    }
}

/// The three cache tiers and the source that fills them.
pub struct WorldTiers<S> {
    source: Arc<S>,
    world: CacheTier<SectorCoord, SectorData>,
    regional: CacheTier<BlockCoord, BlockData>,
    local: CacheTier<ChunkCoord, ChunkData>,
}

impl<S: WorldSource> WorldTiers<S> {
    /// Builds empty tiers sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StreamError::Cache`] if any capacity is zero.
    pub fn new(source: Arc<S>, config: &StreamingConfig) -> StreamResult<Self> {
        Ok(Self {
            source,
            world: CacheTier::new("world", config.world_capacity)?,
            regional: CacheTier::new("regional", config.regional_capacity)?,
            local: CacheTier::new("local", config.local_capacity)?,
        })
    }

    /// The generation source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the sector at `coord`, generating it on a miss.
    ///
    /// # Errors
    ///
    /// Fails if `coord` lies outside the World grid.
    pub fn sector(&self, coord: SectorCoord) -> GenResult<Arc<SectorData>> {
        self.world.get_or_insert(coord, || self.source.generate_sector(coord))
    }

    /// Returns the block at `coord`, generating it and its parent on a miss.
    ///
    /// # Errors
    ///
    /// Fails if the parent sector lies outside the World grid.
    pub fn block(&self, coord: BlockCoord) -> GenResult<Arc<BlockData>> {
        let parent = self.sector(coord.sector())?;
        self.regional
            .get_or_insert(coord, || self.source.generate_block(&parent, coord))
    }

    /// Returns the chunk at `coord`, generating it and its parents on a miss.
    ///
    /// # Errors
    ///
    /// Fails if the containing sector lies outside the World grid.
    pub fn chunk(&self, coord: ChunkCoord) -> GenResult<Arc<ChunkData>> {
        let parent = self.block(coord.block())?;
        self.local
            .get_or_insert(coord, || self.source.generate_chunk(&parent, coord))
    }

    /// Returns the data at `coord`, generating it on a miss.
    ///
    /// # Errors
    ///
    /// Fails if the containing sector lies outside the World grid.
    pub fn get(&self, coord: ScaleCoord) -> GenResult<WorldData> {
        Ok(match coord {
            ScaleCoord::World(c) => WorldData::Sector(self.sector(c)?),
            ScaleCoord::Regional(c) => WorldData::Block(self.block(c)?),
            ScaleCoord::Local(c) => WorldData::Chunk(self.chunk(c)?),
        })
    }

    /// Generates `coord` unless it is resident or in flight. Parents are
    /// fetched through their tiers without refreshing their recency.
    ///
    /// # Returns
    ///
    /// `true` if this call generated the value.
    ///
    /// # Errors
    ///
    /// Fails if the containing sector lies outside the World grid.
    pub fn fill(&self, coord: ScaleCoord) -> GenResult<bool> {
        match coord {
            ScaleCoord::World(c) => self.world.fill(c, || self.source.generate_sector(c)),
            ScaleCoord::Regional(c) => {
                if self.regional.is_known(&c) {
                    return Ok(false);
                }
                let parent = self.quiet_sector(c.sector())?;
                self.regional.fill(c, || self.source.generate_block(&parent, c))
            }
            ScaleCoord::Local(c) => {
                if self.local.is_known(&c) {
                    return Ok(false);
                }
                let parent = self.quiet_block(c.block())?;
                self.local.fill(c, || self.source.generate_chunk(&parent, c))
            }
        }
    }

    fn quiet_sector(&self, coord: SectorCoord) -> GenResult<Arc<SectorData>> {
        self.world.peek_or_insert(coord, || self.source.generate_sector(coord))
    }

    fn quiet_block(&self, coord: BlockCoord) -> GenResult<Arc<BlockData>> {
        let parent = self.quiet_sector(coord.sector())?;
        self.regional
            .peek_or_insert(coord, || self.source.generate_block(&parent, coord))
    }

    /// Returns true if `coord` is resident or being generated.
    #[must_use]
    pub fn is_known(&self, coord: ScaleCoord) -> bool {
        match coord {
            ScaleCoord::World(c) => self.world.is_known(&c),
            ScaleCoord::Regional(c) => self.regional.is_known(&c),
            ScaleCoord::Local(c) => self.local.is_known(&c),
        }
    }

    /// Returns true if `coord` is resident.
    #[must_use]
    pub fn contains(&self, coord: ScaleCoord) -> bool {
        match coord {
            ScaleCoord::World(c) => self.world.contains(&c),
            ScaleCoord::Regional(c) => self.regional.contains(&c),
            ScaleCoord::Local(c) => self.local.contains(&c),
        }
    }

    /// Returns true if the sector containing `coord` is inside the World grid.
    #[must_use]
    pub fn in_world(&self, coord: ScaleCoord) -> bool {
        self.source.shape().contains(coord.sector())
    }

    /// How long the resident value at `coord` took to generate.
    #[must_use]
    pub fn entry_cost(&self, coord: ScaleCoord) -> Option<Duration> {
        match coord {
            ScaleCoord::World(c) => self.world.entry_cost(&c),
            ScaleCoord::Regional(c) => self.regional.entry_cost(&c),
            ScaleCoord::Local(c) => self.local.entry_cost(&c),
        }
    }

    /// Counters of the tier for `scale`.
    #[must_use]
    pub fn stats(&self, scale: Scale) -> CacheStats {
        match scale {
            Scale::World => self.world.stats(),
            Scale::Regional => self.regional.stats(),
            Scale::Local => self.local.stats(),
        }
    }
}
