//! # Regional-Scale Generation
//!
//! Refines a sector into blocks. The parent sector's terrain class picks a
//! rule set and every rule set only returns subtypes that class permits,
//! so an ocean sector can only ever produce water blocks.

use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::coords::{BlockCoord, GridCoord, SectorCoord, BLOCKS_PER_SECTOR};
use crate::error::{GenError, GenResult};
use crate::noise::{NoiseChannel, SimplexNoise, WorldSeed};
use crate::sector::SectorData;
use crate::terrain::{TerrainClass, TerrainSubtype};
use crate::verify::verify_block;

/// Which edges of its sector a block touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundaryMarkers {
    /// Touches the sector's minimum-Y edge.
    pub north: bool,
    /// Touches the sector's maximum-Y edge.
    pub south: bool,
    /// Touches the sector's minimum-X edge.
    pub west: bool,
    /// Touches the sector's maximum-X edge.
    pub east: bool,
}

impl BoundaryMarkers {
    /// Markers for `coord` within its sector.
    #[must_use]
    pub const fn for_block(coord: BlockCoord) -> Self {
        let (x, y) = coord.index_in_sector();
        Self {
            north: y == 0,
            south: y == BLOCKS_PER_SECTOR - 1,
            west: x == 0,
            east: x == BLOCKS_PER_SECTOR - 1,
        }
    }

    /// Returns true if the block touches any sector edge.
    #[must_use]
    pub const fn any(self) -> bool {
        self.north || self.south || self.west || self.east
    }
}

/// Regional description of one block.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockData {
    /// Block this record describes.
    pub coord: BlockCoord,
    /// Key of the parent sector. Its data lives in the World cache.
    pub sector: SectorCoord,
    /// Terrain subtype, always permitted by the parent sector's class.
    pub subtype: TerrainSubtype,
    /// Base elevation in meters: parent elevation plus local variation.
    pub elevation: f64,
    /// Deviation from the parent elevation, in meters.
    pub elevation_variation: f64,
    /// Moisture in [0, 1].
    pub moisture: f64,
    /// Deviation from the parent climate, in degrees.
    pub temperature_variation: f64,
    /// A minor river crosses this block.
    pub has_river: bool,
    /// The block is unusually rich in resources.
    pub has_resource_area: bool,
    /// A settlement sits in this block.
    pub has_settlement: bool,
    /// Sector edges this block touches.
    pub boundary: BoundaryMarkers,
}

/// Generator for Regional blocks.
#[derive(Clone, Debug)]
pub struct RegionalGenerator {
    config: Arc<GenerationConfig>,
    elevation: SimplexNoise,
    moisture: SimplexNoise,
    temperature: SimplexNoise,
    river: SimplexNoise,
    resource: SimplexNoise,
    settlement: SimplexNoise,
}

impl RegionalGenerator {
    /// Creates a regional generator.
    #[must_use]
    pub fn new(seed: WorldSeed, config: Arc<GenerationConfig>) -> Self {
        Self {
            config,
            elevation: SimplexNoise::new(seed.channel(NoiseChannel::RegionalElevation)),
            moisture: SimplexNoise::new(seed.channel(NoiseChannel::RegionalMoisture)),
            temperature: SimplexNoise::new(seed.channel(NoiseChannel::RegionalTemperature)),
            river: SimplexNoise::new(seed.channel(NoiseChannel::MinorRiver)),
            resource: SimplexNoise::new(seed.channel(NoiseChannel::ResourceArea)),
            settlement: SimplexNoise::new(seed.channel(NoiseChannel::Settlement)),
        }
    }

    /// Generates the block at `coord` inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::BlockParentMismatch`] if `parent` is not the
    /// sector containing `coord`.
    pub fn generate_block(&self, parent: &SectorData, coord: BlockCoord) -> GenResult<BlockData> {
        let expected = coord.sector();
        if parent.coord != expected {
            return Err(GenError::BlockParentMismatch {
                block: coord,
                expected,
                actual: parent.coord,
            });
        }

        let noise = &self.config.noise;
        let rules = &self.config.regional;
        let (x, y) = coord.center().as_f64();

        let elevation_signal = self.elevation.layer(&noise.regional_elevation, x, y);
        let moisture_signal = self.moisture.layer(&noise.regional_moisture, x, y);
        let temperature_signal = self.temperature.layer(&noise.regional_temperature, x, y);

        let subtype = self.select_subtype(parent.terrain, elevation_signal, moisture_signal);

        let elevation_variation = elevation_signal * rules.elevation_variation;
        let has_river = parent.has_rivers && self.river.layer(&noise.minor_river, x, y).abs() < rules.river_band;
        let has_resource_area = self.resource.layer(&noise.resource_area, x, y) > rules.resource_area_above;
        let has_settlement = subtype.is_land() && self.settlement.layer(&noise.settlement, x, y) > rules.settlement_above;

        let block = BlockData {
            coord,
            sector: parent.coord,
            subtype,
            elevation: parent.elevation + elevation_variation,
            elevation_variation,
            moisture: ((moisture_signal + 1.0) * 0.5).clamp(0.0, 1.0),
            temperature_variation: temperature_signal * rules.temperature_variation,
            has_river,
            has_resource_area,
            has_settlement,
            boundary: BoundaryMarkers::for_block(coord),
        };
        debug_assert_eq!(verify_block(parent, &block), Vec::new());
        tracing::trace!(x = coord.x, y = coord.y, subtype = ?block.subtype, "generated block");
        Ok(block)
    }

    /// Picks a subtype using the rule set of the parent's terrain class.
    fn select_subtype(&self, terrain: TerrainClass, elevation: f64, moisture: f64) -> TerrainSubtype {
        let r = &self.config.regional;
        match terrain {
            TerrainClass::DeepOcean | TerrainClass::ShallowOcean => TerrainSubtype::Water,
            TerrainClass::Desert => {
                if moisture > r.desert_fertile_above {
                    TerrainSubtype::Fertile
                } else if moisture > r.desert_moist_above {
                    TerrainSubtype::Plains
                } else {
                    TerrainSubtype::Barren
                }
            }
            TerrainClass::Mountains | TerrainClass::HighMountains => {
                if elevation > r.mountain_rocky_above {
                    TerrainSubtype::Rocky
                } else if moisture > r.mountain_hills_moist_above {
                    TerrainSubtype::Hills
                } else {
                    TerrainSubtype::Barren
                }
            }
            TerrainClass::Tropical => {
                if moisture > r.tropical_forest_moist_above {
                    TerrainSubtype::Forest
                } else {
                    TerrainSubtype::Plains
                }
            }
            TerrainClass::CoastalPlains | TerrainClass::TemperateLand | TerrainClass::Tundra => {
                if elevation > r.hills_above {
                    TerrainSubtype::Hills
                } else if moisture > r.marsh_moist_above {
                    TerrainSubtype::Marsh
                } else if moisture > r.forest_moist_above {
                    TerrainSubtype::Forest
                } else if moisture < r.barren_moist_below {
                    TerrainSubtype::Barren
                } else if moisture > r.fertile_moist_above {
                    TerrainSubtype::Fertile
                } else {
                    TerrainSubtype::Plains
                }
            }
        }
    }
}
