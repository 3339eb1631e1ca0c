//! Navigation configuration
//!
//! Loaded from RON (Rusty Object Notation) or JSON, validated once at
//! startup. Invalid grid settings fail fast here instead of at query time.

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::physics::layers;

/// Walkability grid settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World-space center of the grid rectangle
    pub center: Vec3,
    /// Extents on X (width) and Z (depth)
    pub size: Vec2,
    /// Cell edge length in world units
    pub cell_size: f32,
    /// Height of the free space an agent needs above a cell
    pub clearance_height: f32,
    /// Collision layers treated as obstacles
    pub obstacle_mask: u32,
    /// Max ring radius (in cells) when snapping to the nearest walkable cell
    pub ring_search_radius: u32,
    /// Height above ground at which visibility rays are cast
    pub cast_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec2::new(40.0, 40.0),
            cell_size: 0.5,
            clearance_height: 2.0,
            obstacle_mask: layers::OBSTACLE,
            ring_search_radius: 8,
            cast_height: 0.5,
        }
    }
}

impl GridConfig {
    /// Set the grid rectangle
    pub fn with_bounds(mut self, center: Vec3, size: Vec2) -> Self {
        self.center = center;
        self.size = size;
        self
    }

    /// Set the cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the clearance height
    pub fn with_clearance(mut self, clearance_height: f32) -> Self {
        self.clearance_height = clearance_height;
        self
    }

    /// Set the obstacle layer mask
    pub fn with_obstacle_mask(mut self, mask: u32) -> Self {
        self.obstacle_mask = mask;
        self
    }

    /// Set the nearest-walkable search radius
    pub fn with_ring_search_radius(mut self, radius: u32) -> Self {
        self.ring_search_radius = radius;
        self
    }

    /// Check the grid can be built from these settings
    ///
    /// # Errors
    ///
    /// Returns an error for empty or non-finite bounds, a non-positive cell
    /// size, or a negative clearance height
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.size.x.is_finite() && self.size.y.is_finite())
            || self.size.x <= 0.0
            || self.size.y <= 0.0
        {
            return Err(ConfigError::InvalidBounds(self.size));
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !self.clearance_height.is_finite() || self.clearance_height < 0.0 {
            return Err(ConfigError::InvalidClearance(self.clearance_height));
        }
        Ok(())
    }
}

/// Per-agent path following settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Movement speed in units per second
    pub move_speed: f32,
    /// Seconds between scheduled repaths
    pub repath_interval: f32,
    /// Goal displacement that forces an early repath
    pub drift_threshold: f32,
    /// Distance at which the raw waypoint index advances
    pub waypoint_reach: f32,
    /// Distance at which the sticky corner advances
    pub corner_reach: f32,
    /// Seconds between sticky corner recomputations
    pub corner_recompute_interval: f32,
    /// Shortened recompute delay when the next corner is not visible
    pub corner_retry_interval: f32,
    /// Maximum yaw rate in degrees per second
    pub max_turn_deg_per_sec: f32,
    /// Direction smoothing gain `k` in `1 - e^(-k dt)`
    pub smoothing_gain: f32,
    /// Speed at which the walk animation plays at rate 1.0
    pub walk_anim_base_speed: f32,
    /// Lower bound for the walk playback rate
    pub min_playback_rate: f32,
    /// Pin the agent's height after every move
    pub lock_height: bool,
    /// Height used when `lock_height` is set
    pub locked_height: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.5,
            repath_interval: 0.4,
            drift_threshold: 1.0,
            waypoint_reach: 0.55,
            corner_reach: 0.5,
            corner_recompute_interval: 0.25,
            corner_retry_interval: 0.15,
            max_turn_deg_per_sec: 360.0,
            smoothing_gain: 10.0,
            walk_anim_base_speed: 3.5,
            min_playback_rate: 0.1,
            lock_height: true,
            locked_height: 0.89,
        }
    }
}

impl SteeringConfig {
    /// Set movement speed
    pub fn with_speed(mut self, move_speed: f32) -> Self {
        self.move_speed = move_speed;
        self
    }

    /// Set repath interval and drift threshold
    pub fn with_repath(mut self, interval: f32, drift_threshold: f32) -> Self {
        self.repath_interval = interval;
        self.drift_threshold = drift_threshold;
        self
    }

    /// Set waypoint and corner reach distances
    pub fn with_reach(mut self, waypoint_reach: f32, corner_reach: f32) -> Self {
        self.waypoint_reach = waypoint_reach;
        self.corner_reach = corner_reach;
        self
    }

    /// Set the maximum turn rate
    pub fn with_turn_rate(mut self, deg_per_sec: f32) -> Self {
        self.max_turn_deg_per_sec = deg_per_sec;
        self
    }

    /// Enable the height lock at `height`, or disable it with `None`
    pub fn with_height_lock(mut self, height: Option<f32>) -> Self {
        match height {
            Some(y) => {
                self.lock_height = true;
                self.locked_height = y;
            }
            None => self.lock_height = false,
        }
        self
    }

    /// Walk playback rate for the configured speed
    #[must_use]
    pub fn walk_playback_rate(&self) -> f32 {
        (self.move_speed / self.walk_anim_base_speed.max(0.1)).max(self.min_playback_rate)
    }
}

/// Complete navigation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Grid settings
    pub grid: GridConfig,
    /// Default steering settings for agents
    pub steering: SteeringConfig,
}

impl NavConfig {
    /// Load and validate a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse and validate a config from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or validated
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: NavConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.grid.validate()?;
        Ok(config)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: NavConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.grid.validate()?;
        Ok(config)
    }

    /// Save the config to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur while loading or validating configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Grid width or depth is zero, negative, or not finite
    InvalidBounds(Vec2),
    /// Cell size is zero, negative, or not finite
    InvalidCellSize(f32),
    /// Clearance height is negative or not finite
    InvalidClearance(f32),
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBounds(size) => {
                write!(f, "Invalid grid bounds: {} x {}", size.x, size.y)
            }
            Self::InvalidCellSize(size) => write!(f, "Invalid cell size: {size}"),
            Self::InvalidClearance(h) => write!(f, "Invalid clearance height: {h}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
