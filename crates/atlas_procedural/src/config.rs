//! # Generation Settings
//!
//! Every threshold the generators compare against lives here, grouped by
//! the stage that reads it. Defaults reproduce the reference world; a TOML
//! file may override any subset of fields.
//!
//! ```toml
//! [world]
//! width = 32
//! height = 16
//!
//! [elevation]
//! mountains_above = 1200.0
//!
//! [noise.continental]
//! frequency = 0.00003
//! octaves = 5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coords::{Scale, SectorCoord, SECTOR_TILES};
use crate::error::{ConfigError, ConfigResult};
use crate::noise::NoiseLayer;

/// Complete settings for all three generators.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Size and plate layout of the finite World grid.
    pub world: WorldShape,
    /// Frequency and octave shape per noise channel.
    pub noise: NoiseLayers,
    /// Elevation scaling and terrain-class cut points (meters).
    pub elevation: ElevationBands,
    /// Latitude bands and feature-flag thresholds.
    pub climate: ClimateBands,
    /// Regional subtype selection thresholds.
    pub regional: RegionalRules,
    /// Local terrain and resource-cluster parameters.
    pub local: LocalRules,
}

/// Size and plate layout of the World grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldShape {
    /// Width in sectors.
    pub width: u32,
    /// Height in sectors.
    pub height: u32,
    /// Side length of one tectonic plate, in sectors.
    pub plate_span: u32,
    /// Number of distinct plate identifiers.
    pub plate_count: u32,
}

impl Default for WorldShape {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            plate_span: 4,
            plate_count: 8,
        }
    }
}

impl WorldShape {
    /// Returns true if `coord` lies inside the grid.
    #[must_use]
    pub fn contains(&self, coord: SectorCoord) -> bool {
        (0..i64::from(self.width)).contains(&coord.x) && (0..i64::from(self.height)).contains(&coord.y)
    }

    /// Number of sectors in the grid.
    #[must_use]
    pub fn sector_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Grid width and height counted in cells of `scale`.
    #[must_use]
    pub fn cells(&self, scale: Scale) -> (i64, i64) {
        let per_sector = SECTOR_TILES / scale.tile_extent();
        (i64::from(self.width) * per_sector, i64::from(self.height) * per_sector)
    }
}

/// One [`NoiseLayer`] per generator input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseLayers {
    /// Continental base elevation.
    pub continental: NoiseLayer,
    /// Tectonic uplift.
    pub tectonic: NoiseLayer,
    /// Climate variation.
    pub climate: NoiseLayer,
    /// Block elevation variation.
    pub regional_elevation: NoiseLayer,
    /// Block moisture.
    pub regional_moisture: NoiseLayer,
    /// Block temperature variation.
    pub regional_temperature: NoiseLayer,
    /// Minor river placement.
    pub minor_river: NoiseLayer,
    /// Resource-rich areas.
    pub resource_area: NoiseLayer,
    /// Settlement sites.
    pub settlement: NoiseLayer,
    /// Tile terrain selection.
    pub local_terrain: NoiseLayer,
    /// Tile relief.
    pub local_elevation: NoiseLayer,
    /// Stream courses.
    pub local_stream: NoiseLayer,
    /// Cluster center detection, sampled on the cluster lattice.
    pub cluster_detect: NoiseLayer,
    /// Cluster resource kind.
    pub cluster_kind: NoiseLayer,
    /// Per-tile spawn jitter.
    pub cluster_density: NoiseLayer,
    /// Per-tile rarity jitter.
    pub cluster_rarity: NoiseLayer,
}

impl Default for NoiseLayers {
    fn default() -> Self {
        Self {
            continental: NoiseLayer::new(0.000_02, 4),
            tectonic: NoiseLayer::new(0.000_05, 3),
            climate: NoiseLayer::new(0.000_1, 3),
            regional_elevation: NoiseLayer::new(0.000_8, 4),
            regional_moisture: NoiseLayer::new(0.000_6, 3),
            regional_temperature: NoiseLayer::new(0.000_4, 2),
            minor_river: NoiseLayer::new(0.000_5, 2),
            resource_area: NoiseLayer::new(0.001, 2),
            settlement: NoiseLayer::new(0.002, 1),
            local_terrain: NoiseLayer::new(0.04, 3),
            local_elevation: NoiseLayer::new(0.08, 2),
            local_stream: NoiseLayer::new(0.01, 2),
            cluster_detect: NoiseLayer::new(0.11, 1),
            cluster_kind: NoiseLayer::new(0.013, 1),
            cluster_density: NoiseLayer::new(0.2, 1),
            cluster_rarity: NoiseLayer::new(0.15, 1),
        }
    }
}

impl NoiseLayers {
    fn named(&self) -> [(&'static str, &NoiseLayer); 16] {
        [
            ("continental", &self.continental),
            ("tectonic", &self.tectonic),
            ("climate", &self.climate),
            ("regional_elevation", &self.regional_elevation),
            ("regional_moisture", &self.regional_moisture),
            ("regional_temperature", &self.regional_temperature),
            ("minor_river", &self.minor_river),
            ("resource_area", &self.resource_area),
            ("settlement", &self.settlement),
            ("local_terrain", &self.local_terrain),
            ("local_elevation", &self.local_elevation),
            ("local_stream", &self.local_stream),
            ("cluster_detect", &self.cluster_detect),
            ("cluster_kind", &self.cluster_kind),
            ("cluster_density", &self.cluster_density),
            ("cluster_rarity", &self.cluster_rarity),
        ]
    }
}

/// Elevation scaling and terrain-class cut points, in meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElevationBands {
    /// Meters per unit of continental noise.
    pub continental_scale: f64,
    /// Meters per unit of tectonic noise magnitude.
    pub tectonic_scale: f64,
    /// Below this: deep ocean.
    pub deep_ocean_below: f64,
    /// Below this: shallow ocean.
    pub ocean_below: f64,
    /// Land below this: coastal plains.
    pub coastal_below: f64,
    /// Tropical land below this stays tropical lowland.
    pub tropical_lowland_below: f64,
    /// Above this: mountains.
    pub mountains_above: f64,
    /// Above this: high mountains.
    pub high_mountains_above: f64,
}

impl Default for ElevationBands {
    fn default() -> Self {
        Self {
            continental_scale: 2000.0,
            tectonic_scale: 1500.0,
            deep_ocean_below: -500.0,
            ocean_below: 0.0,
            coastal_below: 200.0,
            tropical_lowland_below: 800.0,
            mountains_above: 1000.0,
            high_mountains_above: 2500.0,
        }
    }
}

/// Climate bands and World feature-flag thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClimateBands {
    /// Normalized latitude above which a sector is polar.
    pub polar_latitude: f64,
    /// Normalized latitude below which a sector is tropical.
    pub tropical_latitude: f64,
    /// How far climate noise may shift the latitude proxy.
    pub climate_jitter: f64,
    /// Land with climate noise below this turns to desert outside polar zones.
    pub desert_climate_below: f64,
    /// Tectonic magnitude above which a sector carries a mountain range.
    pub mountain_tectonic_above: f64,
    /// Lowest elevation that can carry a major river.
    pub river_min_elevation: f64,
    /// Highest elevation that can carry a major river.
    pub river_max_elevation: f64,
    /// Continental noise must exceed this for a major river.
    pub river_min_continental: f64,
    /// Climate noise must exceed this for a major river.
    pub river_min_climate: f64,
}

impl Default for ClimateBands {
    fn default() -> Self {
        Self {
            polar_latitude: 0.7,
            tropical_latitude: 0.3,
            climate_jitter: 0.1,
            desert_climate_below: -0.3,
            mountain_tectonic_above: 0.6,
            river_min_elevation: 200.0,
            river_max_elevation: 1500.0,
            river_min_continental: -0.3,
            river_min_climate: -0.2,
        }
    }
}

/// Thresholds for Regional subtype selection, against raw noise in [-1, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionalRules {
    /// Meters per unit of regional elevation noise.
    pub elevation_variation: f64,
    /// Degrees per unit of regional temperature noise.
    pub temperature_variation: f64,
    /// Desert blocks wetter than this are not barren.
    pub desert_moist_above: f64,
    /// Desert blocks wetter than this are fertile (oases).
    pub desert_fertile_above: f64,
    /// Mountain blocks higher than this are rocky.
    pub mountain_rocky_above: f64,
    /// Mountain blocks wetter than this are hills.
    pub mountain_hills_moist_above: f64,
    /// Tropical blocks wetter than this are forest.
    pub tropical_forest_moist_above: f64,
    /// Other land higher than this is hills.
    pub hills_above: f64,
    /// Other land wetter than this is marsh.
    pub marsh_moist_above: f64,
    /// Other land wetter than this is forest.
    pub forest_moist_above: f64,
    /// Other land drier than this is barren.
    pub barren_moist_below: f64,
    /// Other land wetter than this is fertile.
    pub fertile_moist_above: f64,
    /// Minor rivers run where |river noise| is below this.
    pub river_band: f64,
    /// Resource-area noise above this flags the block.
    pub resource_area_above: f64,
    /// Settlement noise above this places a settlement.
    pub settlement_above: f64,
}

impl Default for RegionalRules {
    fn default() -> Self {
        Self {
            elevation_variation: 100.0,
            temperature_variation: 5.0,
            desert_moist_above: 0.3,
            desert_fertile_above: 0.6,
            mountain_rocky_above: 0.3,
            mountain_hills_moist_above: 0.2,
            tropical_forest_moist_above: 0.0,
            hills_above: 0.4,
            marsh_moist_above: 0.7,
            forest_moist_above: 0.4,
            barren_moist_below: -0.3,
            fertile_moist_above: 0.1,
            river_band: 0.1,
            resource_area_above: 0.5,
            settlement_above: 0.8,
        }
    }
}

/// Local terrain and resource-cluster parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalRules {
    /// Stream tiles appear where |stream noise| is below this.
    pub stream_band: f64,
    /// Spacing of the cluster detection lattice, in tiles.
    pub cluster_step: u32,
    /// |detect noise| above this makes a lattice point a candidate center.
    pub detect_above: f64,
    /// Cluster radius at the detection threshold, in tiles.
    pub radius_base: f64,
    /// Extra radius per unit of |detect noise|.
    pub radius_scale: f64,
    /// Cluster density at the detection threshold.
    pub density_base: f64,
    /// Extra density per unit of |detect noise|.
    pub density_scale: f64,
    /// Weight of per-tile density noise.
    pub density_jitter: f64,
    /// Spawn probability must exceed this for a node to appear.
    pub spawn_above: f64,
    /// Weight of per-tile rarity noise.
    pub rarity_jitter: f64,
    /// Rarity score above this is rare.
    pub rare_above: f64,
    /// Rarity score above this is epic.
    pub epic_above: f64,
    /// Added to the spawn chance of every tile in a resource-area block.
    pub resource_area_boost: f64,
    /// How far block moisture shifts palette selection toward the wet end.
    pub moisture_bias: f64,
}

impl Default for LocalRules {
    fn default() -> Self {
        Self {
            stream_band: 0.06,
            cluster_step: 5,
            detect_above: 0.45,
            radius_base: 5.0,
            radius_scale: 8.0,
            density_base: 0.25,
            density_scale: 0.3,
            density_jitter: 0.2,
            spawn_above: 0.1,
            rarity_jitter: 0.3,
            rare_above: 0.6,
            epic_above: 0.8,
            resource_area_boost: 0.4,
            moisture_bias: 0.3,
        }
    }
}

impl LocalRules {
    /// Largest radius any cluster can have, in whole tiles.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn max_cluster_radius(&self) -> i64 {
        (self.radius_base + self.radius_scale).ceil() as i64
    }
}

impl GenerationConfig {
    /// Parses settings from TOML text and validates them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown fields,
    /// and [`ConfigError::Invalid`] if a value violates a constraint.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`GenerationConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every constraint the generators rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> ConfigResult<()> {
        let world = &self.world;
        ensure(world.width > 0 && world.height > 0, "world grid must be at least 1x1")?;
        ensure(world.plate_span > 0, "world.plate_span must be positive")?;
        ensure(world.plate_count > 0, "world.plate_count must be positive")?;

        for (name, layer) in self.noise.named() {
            ensure(
                layer.frequency.is_finite() && layer.frequency > 0.0,
                &format!("noise.{name}.frequency must be positive"),
            )?;
            ensure(layer.octaves > 0, &format!("noise.{name}.octaves must be at least 1"))?;
            ensure(
                layer.persistence.is_finite() && layer.persistence > 0.0,
                &format!("noise.{name}.persistence must be positive"),
            )?;
            ensure(
                layer.lacunarity.is_finite() && layer.lacunarity > 0.0,
                &format!("noise.{name}.lacunarity must be positive"),
            )?;
        }

        let e = &self.elevation;
        ensure(
            all_finite(&[
                e.continental_scale,
                e.tectonic_scale,
                e.deep_ocean_below,
                e.ocean_below,
                e.coastal_below,
                e.tropical_lowland_below,
                e.mountains_above,
                e.high_mountains_above,
            ]),
            "elevation values must be finite",
        )?;
        ensure(
            e.deep_ocean_below < e.ocean_below && e.ocean_below < e.coastal_below,
            "elevation bands must ascend: deep_ocean_below < ocean_below < coastal_below",
        )?;
        ensure(
            e.coastal_below <= e.mountains_above && e.mountains_above < e.high_mountains_above,
            "elevation bands must ascend: coastal_below <= mountains_above < high_mountains_above",
        )?;

        let c = &self.climate;
        ensure(
            all_finite(&[
                c.polar_latitude,
                c.tropical_latitude,
                c.climate_jitter,
                c.desert_climate_below,
                c.mountain_tectonic_above,
                c.river_min_elevation,
                c.river_max_elevation,
                c.river_min_continental,
                c.river_min_climate,
            ]),
            "climate values must be finite",
        )?;
        ensure(
            (0.0..=1.0).contains(&c.tropical_latitude)
                && (0.0..=1.0).contains(&c.polar_latitude)
                && c.tropical_latitude < c.polar_latitude,
            "latitude bands must satisfy 0 <= tropical_latitude < polar_latitude <= 1",
        )?;
        ensure(
            c.river_min_elevation < c.river_max_elevation,
            "climate.river_min_elevation must be below river_max_elevation",
        )?;

        let r = &self.regional;
        ensure(
            all_finite(&[
                r.elevation_variation,
                r.temperature_variation,
                r.desert_moist_above,
                r.desert_fertile_above,
                r.mountain_rocky_above,
                r.mountain_hills_moist_above,
                r.tropical_forest_moist_above,
                r.hills_above,
                r.marsh_moist_above,
                r.forest_moist_above,
                r.barren_moist_below,
                r.fertile_moist_above,
                r.river_band,
                r.resource_area_above,
                r.settlement_above,
            ]),
            "regional values must be finite",
        )?;
        ensure(r.river_band >= 0.0, "regional.river_band must not be negative")?;

        let l = &self.local;
        ensure(
            all_finite(&[
                l.stream_band,
                l.detect_above,
                l.radius_base,
                l.radius_scale,
                l.density_base,
                l.density_scale,
                l.density_jitter,
                l.spawn_above,
                l.rarity_jitter,
                l.rare_above,
                l.epic_above,
                l.resource_area_boost,
                l.moisture_bias,
            ]),
            "local values must be finite",
        )?;
        ensure(l.cluster_step > 0, "local.cluster_step must be positive")?;
        ensure(
            l.radius_base > 0.0 && l.radius_scale >= 0.0,
            "local cluster radius must be positive",
        )?;
        ensure(l.rare_above < l.epic_above, "local.rare_above must be below epic_above")?;
        ensure(
            l.resource_area_boost >= 0.0 && l.moisture_bias >= 0.0,
            "local resource and moisture adjustments must not be negative",
        )?;

        Ok(())
    }
}

fn ensure(condition: bool, message: &str) -> ConfigResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message.to_string()))
    }
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        GenerationConfig::default().validate().unwrap();
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = GenerationConfig::from_toml_str("").unwrap();
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = GenerationConfig::from_toml_str(
            r#"
            [world]
            width = 32

            [elevation]
            mountains_above = 1200.0

            [noise.continental]
            frequency = 0.00003
            octaves = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.world.width, 32);
        assert_eq!(config.world.height, 16);
        assert!((config.elevation.mountains_above - 1200.0).abs() < f64::EPSILON);
        assert_eq!(config.noise.continental.octaves, 5);
        assert!((config.noise.continental.persistence - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.noise.tectonic, NoiseLayers::default().tectonic);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = GenerationConfig::from_toml_str("[world]\nwidht = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_world_rejected() {
        let err = GenerationConfig::from_toml_str("[world]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unordered_bands_rejected() {
        let mut config = GenerationConfig::default();
        config.elevation.deep_ocean_below = 10.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GenerationConfig::default();
        config.climate.tropical_latitude = 0.9;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_octaves_rejected() {
        let mut config = GenerationConfig::default();
        config.noise.local_terrain.octaves = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("local_terrain"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GenerationConfig::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_world_shape_contains() {
        let shape = WorldShape::default();
        assert!(shape.contains(SectorCoord::new(0, 0)));
        assert!(shape.contains(SectorCoord::new(15, 15)));
        assert!(!shape.contains(SectorCoord::new(16, 0)));
        assert!(!shape.contains(SectorCoord::new(0, -1)));
        assert_eq!(shape.sector_count(), 256);
        assert_eq!(shape.cells(Scale::World), (16, 16));
        assert_eq!(shape.cells(Scale::Regional), (256, 256));
        assert_eq!(shape.cells(Scale::Local), (8192, 8192));
    }

    #[test]
    fn test_negative_local_adjustment_rejected() {
        let mut config = GenerationConfig::default();
        config.local.resource_area_boost = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_max_cluster_radius() {
        assert_eq!(LocalRules::default().max_cluster_radius(), 13);
    }
}
