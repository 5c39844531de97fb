//! Game Rules Configuration
//!
//! Sensor and visibility settings shared by every participant. Loaded once
//! before the match starts; part of the synced state.

use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::info;

use crate::core::fixed::{GAME_SPEED, UNIT_SLOWUPDATE_RATE};
use crate::error::ConfigError;

/// Which features are visible regardless of line of sight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FeatureVisibility {
    /// Every feature needs LOS.
    None = 0,
    /// Gaia features are always visible.
    GaiaOnly = 1,
    /// Gaia features and features of the reader's ally team.
    GaiaAllied = 2,
    /// Every feature is always visible.
    All = 3,
}

/// Sensor and rules settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// LOS grid resolution as a power of two over `SQUARE_SIZE`
    pub los_mip_level: u32,
    /// Air LOS grid resolution
    pub air_mip_level: u32,
    /// Radar/sonar/jammer grid resolution
    pub radar_mip_level: u32,
    /// Underwater objects are sensed by sonar instead of radar
    pub require_sonar_under_water: bool,
    /// Each ally team has its own jammer coverage
    pub separate_jammers: bool,
    /// Feature visibility policy
    pub feature_visibility: FeatureVisibility,
    /// Previously seen buildings stay where they were seen
    pub ghosted_buildings: bool,
    /// Quad-field bucket edge in elmos
    pub quad_size: u32,
    /// Radar error radius in elmos
    pub base_radar_error_size: u32,
    /// Radar error multiplier applied by game rules
    pub base_radar_error_mult: u32,
    /// Frames between radar error target updates
    pub pos_error_update_interval: u32,
    /// Frames between team statistics samples
    pub stats_frame_interval: u32,
    /// Synced contexts only see players that were part of the recorded demo
    pub host_demo: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            los_mip_level: 1,
            air_mip_level: 1,
            radar_mip_level: 2,
            require_sonar_under_water: true,
            separate_jammers: true,
            feature_visibility: FeatureVisibility::All,
            ghosted_buildings: true,
            quad_size: 128,
            base_radar_error_size: 96,
            base_radar_error_mult: 2,
            pos_error_update_interval: UNIT_SLOWUPDATE_RATE,
            stats_frame_interval: GAME_SPEED * 16, // 16 seconds
            host_demo: false,
        }
    }
}

impl RulesConfig {
    /// Parse from a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!(path = %path.display(), "loaded rules config");
        Ok(config)
    }

    /// Reject values the sensor grids cannot represent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, mip) in [
            ("los_mip_level", self.los_mip_level),
            ("air_mip_level", self.air_mip_level),
            ("radar_mip_level", self.radar_mip_level),
        ] {
            if mip > 6 {
                return Err(ConfigError::Invalid(format!("{} must be at most 6, got {}", name, mip)));
            }
        }
        if self.quad_size == 0 {
            return Err(ConfigError::Invalid("quad_size must be positive".into()));
        }
        if self.pos_error_update_interval == 0 || self.stats_frame_interval == 0 {
            return Err(ConfigError::Invalid("update intervals must be positive".into()));
        }
        Ok(())
    }
}
