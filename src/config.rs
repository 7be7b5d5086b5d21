//! Configuration for the grid index and the batch loader.
//!
//! ```rust
//! use fleetgrid::Config;
//!
//! let json = r#"{
//!     "grid": { "split_threshold": 64 },
//!     "load": { "limit": 1000, "strict": true }
//! }"#;
//! let config = Config::from_json(json).unwrap();
//! assert_eq!(config.grid.split_threshold, 64);
//! assert!(config.load.strict);
//! ```
use crate::error::FleetError;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub load: LoadConfig,
}

/// Shape of the block tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// A leaf splits into quadrants once it holds more entries than this.
    #[serde(default = "GridConfig::default_split_threshold")]
    pub split_threshold: usize,

    /// Leaves at or below this size (degrees) never split. Bounds the depth
    /// when many entries share one coordinate.
    #[serde(default = "GridConfig::default_min_block_size")]
    pub min_block_size: f64,
}

/// Binary feed reading options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadConfig {
    /// Maximum number of records to read, 0 for the whole file.
    #[serde(default)]
    pub limit: usize,

    /// Fail with `TruncatedFile` instead of stopping quietly at a partial
    /// trailing record.
    #[serde(default)]
    pub strict: bool,
}

impl GridConfig {
    const fn default_split_threshold() -> usize {
        1000
    }

    fn default_min_block_size() -> f64 {
        1.0 / f64::from(1u32 << 20)
    }

    pub fn with_split_threshold(mut self, threshold: usize) -> Self {
        assert!(threshold > 0, "Split threshold must be greater than zero");
        self.split_threshold = threshold;
        self
    }

    pub fn with_min_block_size(mut self, size: f64) -> Self {
        assert!(
            size.is_finite() && size > 0.0,
            "Minimum block size must be positive and finite"
        );
        self.min_block_size = size;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.split_threshold == 0 {
            return Err("Split threshold must be greater than zero".to_string());
        }
        if !self.min_block_size.is_finite() || self.min_block_size <= 0.0 {
            return Err("Minimum block size must be positive and finite".to_string());
        }
        if self.min_block_size > 1.0 {
            return Err("Minimum block size must not exceed the 1 degree base block".to_string());
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            split_threshold: Self::default_split_threshold(),
            min_block_size: Self::default_min_block_size(),
        }
    }
}

impl LoadConfig {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Config {
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_load(mut self, load: LoadConfig) -> Self {
        self.load = load;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.grid.validate()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read a configuration file. `.toml` files need the `toml` feature;
    /// anything else is parsed as JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        #[cfg(feature = "toml")]
        if path.extension().is_some_and(|ext| ext == "toml") {
            let config: Config =
                toml::from_str(&text).map_err(|e| FleetError::InvalidConfig(e.to_string()))?;
            config.validate().map_err(FleetError::InvalidConfig)?;
            return Ok(config);
        }

        let config: Config = serde_json::from_str(&text)?;
        config.validate().map_err(FleetError::InvalidConfig)?;
        Ok(config)
    }
}
