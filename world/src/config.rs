//! Zone configuration loaded from TOML or built in code.

use serde::Deserialize;
use skirmish_core::Command;
use thiserror::Error;

/// Declarative zone parameters with sensible battlefield defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoneConfig {
    /// Zone width in world units.
    pub width: f32,
    /// Zone height in world units.
    pub height: f32,
    /// Side length of a square collision tile in world units.
    pub tile_size: f32,
    /// Number of spatial-index bucket columns.
    pub spatial_columns: u32,
    /// Number of spatial-index bucket rows.
    pub spatial_rows: u32,
    /// Upper bound on node expansions per pathfinding query.
    pub search_budget: u32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            tile_size: 32.0,
            spatial_columns: 5,
            spatial_rows: 5,
            search_budget: 4096,
        }
    }
}

impl ZoneConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects parameter combinations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0) || !(self.height > 0.0) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if self.spatial_columns == 0 || self.spatial_rows == 0 {
            return Err(ConfigError::InvalidSpatialResolution {
                columns: self.spatial_columns,
                rows: self.spatial_rows,
            });
        }
        if self.search_budget == 0 {
            return Err(ConfigError::ZeroSearchBudget);
        }
        Ok(())
    }

    /// The configuration command this config expands to.
    #[must_use]
    pub fn command(&self) -> Command {
        Command::ConfigureZone {
            width: self.width,
            height: self.height,
            tile_size: self.tile_size,
            spatial_columns: self.spatial_columns,
            spatial_rows: self.spatial_rows,
        }
    }
}

/// Reasons a zone configuration is rejected before any state is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("failed to parse zone configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Width or height is zero, negative, or not a number.
    #[error("zone dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Offending width value.
        width: f32,
        /// Offending height value.
        height: f32,
    },
    /// Tile size is zero, negative, or not a number.
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),
    /// One of the spatial bucket dimensions is zero.
    #[error("spatial resolution must be non-zero, got {columns}x{rows}")]
    InvalidSpatialResolution {
        /// Offending bucket column count.
        columns: u32,
        /// Offending bucket row count.
        rows: u32,
    },
    /// The pathfinding expansion budget is zero.
    #[error("search budget must be non-zero")]
    ZeroSearchBudget,
}
