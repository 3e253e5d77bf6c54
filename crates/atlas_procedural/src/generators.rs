//! The three scale generators sharing one seed and one set of settings.

use std::sync::Arc;

use crate::block::{BlockData, RegionalGenerator};
use crate::chunk::{ChunkData, LocalGenerator};
use crate::config::GenerationConfig;
use crate::coords::{BlockCoord, ChunkCoord, SectorCoord};
use crate::error::{ConfigResult, GenResult};
use crate::noise::WorldSeed;
use crate::sector::{SectorData, WorldGenerator};

/// World, Regional and Local generators for one world.
///
/// Every generator is immutable, so the bundle is shared between threads
/// behind an `Arc` without locking.
#[derive(Clone, Debug)]
pub struct Generators {
    seed: WorldSeed,
    config: Arc<GenerationConfig>,
    world: WorldGenerator,
    regional: RegionalGenerator,
    local: LocalGenerator,
}

impl Generators {
    /// Validates `config` and builds the generators for `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Invalid`] if `config` fails validation.
    pub fn new(seed: WorldSeed, config: GenerationConfig) -> ConfigResult<Self> {
        config.validate()?;
        let config = Arc::new(config);
        Ok(Self {
            seed,
            world: WorldGenerator::new(seed, Arc::clone(&config)),
            regional: RegionalGenerator::new(seed, Arc::clone(&config)),
            local: LocalGenerator::new(seed, Arc::clone(&config)),
            config,
        })
    }

    /// Generators with default settings.
    #[must_use]
    pub fn with_seed(seed: WorldSeed) -> Self {
        let config = Arc::new(GenerationConfig::default());
        Self {
            seed,
            world: WorldGenerator::new(seed, Arc::clone(&config)),
            regional: RegionalGenerator::new(seed, Arc::clone(&config)),
            local: LocalGenerator::new(seed, Arc::clone(&config)),
            config,
        }
    }

    /// World seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Shared settings.
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// World-scale generator.
    #[must_use]
    pub const fn world(&self) -> &WorldGenerator {
        &self.world
    }

    /// Regional-scale generator.
    #[must_use]
    pub const fn regional(&self) -> &RegionalGenerator {
        &self.regional
    }

    /// Local-scale generator.
    #[must_use]
    pub const fn local(&self) -> &LocalGenerator {
        &self.local
    }

    /// Generates a sector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenError::OutOfBounds`] outside the World grid.
    pub fn sector(&self, coord: SectorCoord) -> GenResult<SectorData> {
        self.world.generate_sector(coord)
    }

    /// Generates a block together with its parent sector, without caching.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenError::OutOfBounds`] if the parent sector is
    /// outside the World grid.
    pub fn block(&self, coord: BlockCoord) -> GenResult<BlockData> {
        let sector = self.sector(coord.sector())?;
        self.regional.generate_block(&sector, coord)
    }

    /// Generates a chunk along with its whole parent chain, without caching.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenError::OutOfBounds`] if the containing sector is
    /// outside the World grid.
    pub fn chunk(&self, coord: ChunkCoord) -> GenResult<ChunkData> {
        let block = self.block(coord.block())?;
        self.local.generate_chunk(&block, coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, GenError};

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GenerationConfig::default();
        config.world.width = 0;
        assert!(matches!(
            Generators::new(WorldSeed::new(1), config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_chain_matches_manual_generation() {
        let gens = Generators::with_seed(WorldSeed::new(42));
        let coord = ChunkCoord::new(700, 1300);
        let sector = gens.world().generate_sector(coord.sector()).unwrap();
        let block = gens.regional().generate_block(&sector, coord.block()).unwrap();
        let chunk = gens.local().generate_chunk(&block, coord).unwrap();
        assert_eq!(gens.chunk(coord).unwrap(), chunk);
        assert_eq!(gens.block(coord.block()).unwrap(), block);
    }

    #[test]
    fn test_chain_outside_world_is_bounds_error() {
        let gens = Generators::with_seed(WorldSeed::new(42));
        let err = gens.chunk(ChunkCoord::new(-1, 0)).unwrap_err();
        assert!(matches!(err, GenError::OutOfBounds { x: -1, y: 0, .. }));
    }
}
