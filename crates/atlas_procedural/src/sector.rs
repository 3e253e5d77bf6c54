//! # World-Scale Generation
//!
//! Classifies each sector of the finite World grid from three continental
//! signals sampled at the sector center:
//!
//! - **Continental**: base elevation, oceans vs. continents
//! - **Tectonic**: uplift magnitude, mountain ranges
//! - **Climate**: shifts the latitude bands and carves deserts

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{GenerationConfig, WorldShape};
use crate::coords::{GridCoord, SectorCoord};
use crate::error::{GenError, GenResult};
use crate::noise::{NoiseChannel, SimplexNoise, WorldSeed};
use crate::terrain::{ClimateZone, TerrainClass};

/// Continental classification of one World sector.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorData {
    /// Sector this record describes.
    pub coord: SectorCoord,
    /// Dominant terrain class.
    pub terrain: TerrainClass,
    /// Elevation in meters at the sector center.
    pub elevation: f64,
    /// Climate band.
    pub climate: ClimateZone,
    /// A mountain range crosses this sector.
    pub has_mountains: bool,
    /// A major river system runs through this sector.
    pub has_rivers: bool,
    /// Tectonic plate identifier.
    pub plate_id: u32,
    /// Raw continental signal in [-1, 1].
    pub continental: f64,
    /// Raw tectonic signal in [-1, 1].
    pub tectonic: f64,
    /// Raw climate signal in [-1, 1].
    pub climate_variation: f64,
}

/// Aggregate description of the whole World grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSummary {
    /// Number of sectors.
    pub sectors: usize,
    /// Sectors per terrain class.
    pub terrain: BTreeMap<TerrainClass, usize>,
    /// Sectors per climate zone.
    pub climate: BTreeMap<ClimateZone, usize>,
    /// Sectors with a mountain range.
    pub mountain_ranges: usize,
    /// Sectors with a major river system.
    pub river_systems: usize,
    /// Mean sector elevation in meters.
    pub mean_elevation: f64,
}

impl WorldSummary {
    /// Fraction of sectors that are not ocean.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn land_fraction(&self) -> f64 {
        if self.sectors == 0 {
            return 0.0;
        }
        let land: usize = self
            .terrain
            .iter()
            .filter(|(class, _)| !class.is_ocean())
            .map(|(_, count)| count)
            .sum();
        land as f64 / self.sectors as f64
    }
}

/// Generator for World sectors.
///
/// Holds only the seed, shared settings and `Copy` noise handles, so one
/// instance can be used from any number of threads.
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    config: Arc<GenerationConfig>,
    continental: SimplexNoise,
    tectonic: SimplexNoise,
    climate: SimplexNoise,
}

impl WorldGenerator {
    /// Creates a world generator.
    #[must_use]
    pub fn new(seed: WorldSeed, config: Arc<GenerationConfig>) -> Self {
        Self {
            config,
            continental: SimplexNoise::new(seed.channel(NoiseChannel::Continental)),
            tectonic: SimplexNoise::new(seed.channel(NoiseChannel::Tectonic)),
            climate: SimplexNoise::new(seed.channel(NoiseChannel::Climate)),
        }
    }

    /// Size of the World grid.
    #[must_use]
    pub fn shape(&self) -> &WorldShape {
        &self.config.world
    }

    /// Generates the sector at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::OutOfBounds`] if `coord` is outside the World grid.
    pub fn generate_sector(&self, coord: SectorCoord) -> GenResult<SectorData> {
        self.check_bounds(coord)?;
        let sector = self.sample(coord);
        tracing::trace!(x = coord.x, y = coord.y, terrain = ?sector.terrain, "generated sector");
        Ok(sector)
    }

    /// Rejects sectors outside the World grid.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::OutOfBounds`] if `coord` is outside the World grid.
    pub fn check_bounds(&self, coord: SectorCoord) -> GenResult<()> {
        let shape = &self.config.world;
        if shape.contains(coord) {
            Ok(())
        } else {
            Err(GenError::OutOfBounds {
                x: coord.x,
                y: coord.y,
                width: shape.width,
                height: shape.height,
            })
        }
    }

    /// Every sector of the grid, row-major.
    pub fn sectors(&self) -> impl Iterator<Item = SectorCoord> {
        let width = i64::from(self.config.world.width);
        let height = i64::from(self.config.world.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| SectorCoord::new(x, y)))
    }

    /// Generates every sector and tallies the result.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(&self) -> WorldSummary {
        let mut summary = WorldSummary::default();
        let mut elevation_sum = 0.0;

        for coord in self.sectors() {
            let sector = self.sample(coord);
            summary.sectors += 1;
            *summary.terrain.entry(sector.terrain).or_insert(0) += 1;
            *summary.climate.entry(sector.climate).or_insert(0) += 1;
            summary.mountain_ranges += usize::from(sector.has_mountains);
            summary.river_systems += usize::from(sector.has_rivers);
            elevation_sum += sector.elevation;
        }

        if summary.sectors > 0 {
            summary.mean_elevation = elevation_sum / summary.sectors as f64;
        }
        summary
    }

    fn sample(&self, coord: SectorCoord) -> SectorData {
        let cfg = &self.config;
        let (x, y) = coord.center().as_f64();

        let continental = self.continental.layer(&cfg.noise.continental, x, y);
        let tectonic = self.tectonic.layer(&cfg.noise.tectonic, x, y);
        let climate_variation = self.climate.layer(&cfg.noise.climate, x, y);

        let elevation = continental * cfg.elevation.continental_scale + tectonic.abs() * cfg.elevation.tectonic_scale;
        let climate = self.climate_zone(coord, climate_variation);
        let terrain = self.classify(elevation, climate, climate_variation);

        let bands = &cfg.climate;
        let has_mountains = tectonic.abs() > bands.mountain_tectonic_above;
        let has_rivers = !terrain.is_ocean()
            && elevation > bands.river_min_elevation
            && elevation < bands.river_max_elevation
            && continental > bands.river_min_continental
            && climate_variation > bands.river_min_climate;

        SectorData {
            coord,
            terrain,
            elevation,
            climate,
            has_mountains,
            has_rivers,
            plate_id: self.plate_id(coord),
            continental,
            tectonic,
            climate_variation,
        }
    }

    /// Distance from the equator row, 0 at the equator and 1 at either edge.
    #[allow(clippy::cast_precision_loss)]
    fn latitude(&self, coord: SectorCoord) -> f64 {
        let half = f64::from(self.config.world.height) / 2.0;
        ((coord.y as f64 + 0.5 - half).abs() / half).min(1.0)
    }

    fn climate_zone(&self, coord: SectorCoord, climate_variation: f64) -> ClimateZone {
        let bands = &self.config.climate;
        let latitude = (self.latitude(coord) + climate_variation * bands.climate_jitter).clamp(0.0, 1.0);
        if latitude > bands.polar_latitude {
            ClimateZone::Polar
        } else if latitude < bands.tropical_latitude {
            ClimateZone::Tropical
        } else {
            ClimateZone::Temperate
        }
    }

    fn classify(&self, elevation: f64, climate: ClimateZone, climate_variation: f64) -> TerrainClass {
        let bands = &self.config.elevation;

        if elevation < bands.deep_ocean_below {
            return TerrainClass::DeepOcean;
        }
        if elevation < bands.ocean_below {
            return TerrainClass::ShallowOcean;
        }
        if elevation > bands.high_mountains_above {
            return TerrainClass::HighMountains;
        }
        if elevation > bands.mountains_above {
            return TerrainClass::Mountains;
        }

        if climate != ClimateZone::Polar && climate_variation < self.config.climate.desert_climate_below {
            return TerrainClass::Desert;
        }

        match climate {
            ClimateZone::Polar => TerrainClass::Tundra,
            ClimateZone::Tropical if elevation < bands.tropical_lowland_below => TerrainClass::Tropical,
            _ if elevation < bands.coastal_below => TerrainClass::CoastalPlains,
            _ => TerrainClass::TemperateLand,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn plate_id(&self, coord: SectorCoord) -> u32 {
        let shape = &self.config.world;
        let span = i64::from(shape.plate_span);
        let rows = i64::from(shape.height.div_ceil(shape.plate_span));
        let plate = (coord.x / span) * rows + coord.y / span;
        plate.rem_euclid(i64::from(shape.plate_count)) as u32
    }
}
