//! # Engine Configuration
//!
//! Settings are read once, before the scheduler starts. Every section has
//! defaults, so a file only needs the values it changes:
//!
//! ```toml
//! seed = 42
//!
//! [generation.world]
//! width = 32
//! height = 32
//!
//! [streaming]
//! workers = 4
//! tick_budget = 8
//! ```

use std::path::Path;

use atlas_procedural::{ConfigError, ConfigResult, GenerationConfig, WorldSeed};
use serde::{Deserialize, Serialize};

/// Cache sizes and worker settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamingConfig {
    /// World tier capacity in sectors.
    pub world_capacity: usize,
    /// Regional tier capacity in blocks.
    pub regional_capacity: usize,
    /// Local tier capacity in chunks.
    pub local_capacity: usize,
    /// Background worker threads.
    pub workers: usize,
    /// Background generations allowed per tick.
    pub tick_budget: usize,
    /// Buffered scheduler events before new ones are dropped.
    pub event_capacity: usize,
    /// Largest preload radius honored, in cells of the active scale.
    pub max_preload_radius: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            // The default 16x16 grid stays fully resident
            world_capacity: 256,
            regional_capacity: 1024,
            local_capacity: 4096,
            workers: 2,
            tick_budget: 16,
            event_capacity: 1024,
            max_preload_radius: 64,
        }
    }
}

impl StreamingConfig {
    /// Checks worker settings. Tier capacities are checked by the tiers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("streaming.workers must be at least 1".into()));
        }
        if self.tick_budget == 0 {
            return Err(ConfigError::Invalid("streaming.tick_budget must be at least 1".into()));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("streaming.event_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

/// Everything needed to start a scheduler.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// World seed.
    pub seed: WorldSeed,
    /// Generator settings.
    pub generation: GenerationConfig,
    /// Cache and worker settings.
    pub streaming: StreamingConfig,
}

impl EngineConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown fields,
    /// and [`ConfigError::Invalid`] if a value violates a constraint.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.generation.validate()?;
        config.streaming.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.seed.value(), 42);
        assert_eq!(config.streaming.world_capacity, 256);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r"
            seed = 7

            [generation.world]
            width = 32

            [streaming]
            workers = 4
            tick_budget = 8
            ",
        )
        .unwrap();
        assert_eq!(config.seed.value(), 7);
        assert_eq!(config.generation.world.width, 32);
        assert_eq!(config.generation.world.height, 16);
        assert_eq!(config.streaming.workers, 4);
        assert_eq!(config.streaming.tick_budget, 8);
        assert_eq!(config.streaming.local_capacity, 4096);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EngineConfig::from_toml_str("[streaming]\nthreads = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = EngineConfig::from_toml_str("[streaming]\nworkers = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("workers")));
    }

    #[test]
    fn test_invalid_generation_rejected() {
        let err = EngineConfig::from_toml_str("[generation.world]\nheight = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_path("/nonexistent/atlas.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
