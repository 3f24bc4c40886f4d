//! # Level Configuration
//!
//! The configuration surface of a level: grid shape, stage count, seeding,
//! brick gate ratio, fence and runway geometry, and per-kind pool sizing.
//!
//! Every field has a default, so a config file only has to name what it
//! changes:
//!
//! ```toml
//! width = 15
//! total_stages = 5
//!
//! [pools.wall]
//! initial_size = 100
//! max_size = 800
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::maze::MAX_DIMENSION;
use crate::pool::ResourceKind;

// Re-export from the config module for compatibility
pub use crate::config::{Config, ConfigError};

/// # Pool Sizing
///
/// Pre-allocation and hard capacity of one resource kind's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSizing {
    /// Instances created up front
    pub initial_size: usize,
    /// Upper bound on instances ever created for the kind
    pub max_size: usize,
}

impl PoolSizing {
    /// Create a sizing
    pub const fn new(initial_size: usize, max_size: usize) -> Self {
        Self { initial_size, max_size }
    }
}

/// # Pool Configuration
///
/// One [`PoolSizing`] per [`ResourceKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Walkable maze cells
    pub floor: PoolSizing,
    /// Blocking maze cells
    pub wall: PoolSizing,
    /// Raised fence ends
    pub win_trigger: PoolSizing,
    /// Flat fence cells
    pub fence_filler: PoolSizing,
    /// Runway line segments
    pub line: PoolSizing,
    /// Runway bricks
    pub brick: PoolSizing,
    /// End-of-runway marker
    pub win_position: PoolSizing,
}

impl PoolConfig {
    /// Sizing for `kind`
    pub fn sizing(&self, kind: ResourceKind) -> PoolSizing {
        match kind {
            ResourceKind::Floor => self.floor,
            ResourceKind::Wall => self.wall,
            ResourceKind::WinTrigger => self.win_trigger,
            ResourceKind::FenceFiller => self.fence_filler,
            ResourceKind::Line => self.line,
            ResourceKind::Brick => self.brick,
            ResourceKind::WinPosition => self.win_position,
        }
    }

    /// Replace the sizing for `kind`
    pub fn with_sizing(mut self, kind: ResourceKind, sizing: PoolSizing) -> Self {
        let slot = match kind {
            ResourceKind::Floor => &mut self.floor,
            ResourceKind::Wall => &mut self.wall,
            ResourceKind::WinTrigger => &mut self.win_trigger,
            ResourceKind::FenceFiller => &mut self.fence_filler,
            ResourceKind::Line => &mut self.line,
            ResourceKind::Brick => &mut self.brick,
            ResourceKind::WinPosition => &mut self.win_position,
        };
        *slot = sizing;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            floor: PoolSizing::new(200, 1000),
            wall: PoolSizing::new(300, 1500),
            win_trigger: PoolSizing::new(10, 50),
            fence_filler: PoolSizing::new(20, 200),
            line: PoolSizing::new(20, 600),
            brick: PoolSizing::new(50, 600),
            win_position: PoolSizing::new(1, 5),
        }
    }
}

/// Number of steps laid on the final runway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunwayLength {
    /// Always this many steps
    Fixed(usize),
    /// As many steps as the last stage has floor cells
    FloorCount,
}

impl RunwayLength {
    /// Resolve against the last stage's floor count
    pub fn resolve(self, last_floor_count: usize) -> usize {
        match self {
            Self::Fixed(steps) => steps,
            Self::FloorCount => last_floor_count,
        }
    }
}

impl Default for RunwayLength {
    fn default() -> Self {
        Self::Fixed(20)
    }
}

/// # Level Configuration
///
/// Everything the composer needs to lay out a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Grid columns per stage
    pub width: usize,
    /// Grid rows per stage
    pub height: usize,
    /// World size of one cell
    pub cell_size: f32,
    /// Base seed; 0 draws a fresh seed for every stage
    pub random_seed: i32,
    /// Stages per level
    pub total_stages: usize,
    /// Share of the last stage's floor cells needed to pass
    pub brick_threshold_ratio: f64,
    /// Height of the raised fence ends
    pub win_prefab_height: f32,
    /// Height of the runway
    pub runway_height: f32,
    /// Steps on the final runway
    pub runway_length: RunwayLength,
    /// Pool sizing per resource kind
    pub pools: PoolConfig,
}

impl LevelConfig {
    /// Create a configuration with the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid shape
    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the base seed
    pub fn with_seed(mut self, seed: i32) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set the number of stages
    pub fn with_stages(mut self, total_stages: usize) -> Self {
        self.total_stages = total_stages;
        self
    }

    /// Set the brick gate ratio
    pub fn with_brick_ratio(mut self, ratio: f64) -> Self {
        self.brick_threshold_ratio = ratio;
        self
    }

    /// Set the runway length policy
    pub fn with_runway_length(mut self, length: RunwayLength) -> Self {
        self.runway_length = length;
        self
    }

    /// Set pool sizing
    pub fn with_pools(mut self, pools: PoolConfig) -> Self {
        self.pools = pools;
        self
    }

    /// Load a configuration file and reject values that cannot describe a level
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Bricks needed to pass a stage with `floor_count` floor cells
    pub fn brick_threshold(&self, floor_count: usize) -> usize {
        // Epsilon keeps exact products like 140 * 0.3 from flooring to 41.
        (floor_count as f64 * self.brick_threshold_ratio + 1e-9).floor() as usize
    }

    /// Validate everything except the minimum grid shape
    pub fn validate(&self) -> Result<(), String> {
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(format!(
                "Grid {}x{} exceeds the {}x{} limit",
                self.width, self.height, MAX_DIMENSION, MAX_DIMENSION
            ));
        }

        if self.total_stages == 0 {
            return Err("Total stages must be at least 1".to_string());
        }

        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(format!("Cell size must be positive and finite, got {}", self.cell_size));
        }

        if !(0.0..=1.0).contains(&self.brick_threshold_ratio) {
            return Err(format!(
                "Brick threshold ratio must lie in [0, 1], got {}",
                self.brick_threshold_ratio
            ));
        }

        if !self.win_prefab_height.is_finite() || !self.runway_height.is_finite() {
            return Err("Fence and runway heights must be finite".to_string());
        }

        Ok(())
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            cell_size: 2.0,
            random_seed: 0,
            total_stages: 3,
            brick_threshold_ratio: 0.4,
            win_prefab_height: 1.0,
            runway_height: 0.0,
            runway_length: RunwayLength::default(),
            pools: PoolConfig::default(),
        }
    }
}

impl Config for LevelConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LevelConfig::default();
        assert_eq!((config.width, config.height), (20, 20));
        assert_eq!(config.total_stages, 3);
        assert_eq!(config.random_seed, 0);
        assert_eq!(config.pools.sizing(ResourceKind::Wall), PoolSizing::new(300, 1500));
        assert_eq!(config.pools.sizing(ResourceKind::WinPosition), PoolSizing::new(1, 5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_brick_threshold_floors() {
        let config = LevelConfig::new().with_brick_ratio(0.3);
        assert_eq!(config.brick_threshold(140), 42);
        assert_eq!(config.brick_threshold(141), 42);

        let config = LevelConfig::new().with_brick_ratio(0.4);
        assert_eq!(config.brick_threshold(140), 56);
        assert_eq!(config.brick_threshold(0), 0);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(LevelConfig::new().with_stages(0).validate().is_err());
        assert!(LevelConfig::new().with_cell_size(0.0).validate().is_err());
        assert!(LevelConfig::new().with_cell_size(f32::NAN).validate().is_err());
        assert!(LevelConfig::new().with_brick_ratio(1.5).validate().is_err());
        assert!(LevelConfig::new().with_brick_ratio(-0.1).validate().is_err());
        assert!(LevelConfig::new().with_grid(usize::MAX / 2, 20).validate().is_err());
        assert!(LevelConfig::new().with_grid(20, MAX_DIMENSION + 1).validate().is_err());
        assert!(LevelConfig::new().with_grid(MAX_DIMENSION, 3).validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let source = r#"
            width = 15
            random_seed = 7
            runway_length = "floor_count"

            [pools.brick]
            initial_size = 5
            max_size = 10
        "#;

        let config: LevelConfig = toml::from_str(source).expect("Should parse");
        assert_eq!(config.width, 15);
        assert_eq!(config.height, 20);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.runway_length, RunwayLength::FloorCount);
        assert_eq!(config.pools.brick, PoolSizing::new(5, 10));
        assert_eq!(config.pools.floor, PoolSizing::new(200, 1000));
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("stage_engine_level_{}.ron", std::process::id()));
        let config = LevelConfig::new()
            .with_grid(9, 11)
            .with_runway_length(RunwayLength::Fixed(4))
            .with_pools(PoolConfig::default().with_sizing(ResourceKind::Line, PoolSizing::new(2, 8)));

        config.save_to_file(&path).expect("Should save");
        let loaded = LevelConfig::load_from_file(&path).expect("Should load");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_validated_rejects_unusable_values() {
        let path = std::env::temp_dir().join(format!("stage_engine_invalid_{}.toml", std::process::id()));
        std::fs::write(&path, "total_stages = 0\n").expect("Should write");
        let result = LevelConfig::load_validated(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_validated_accepts_sample_level() {
        let path = std::env::temp_dir().join(format!("stage_engine_valid_{}.toml", std::process::id()));
        std::fs::write(&path, "width = 15\nheight = 15\n").expect("Should write");
        let result = LevelConfig::load_validated(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(result.expect("Should load").width, 15);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = LevelConfig::default().save_to_file("level.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_runway_length_resolution() {
        assert_eq!(RunwayLength::Fixed(20).resolve(140), 20);
        assert_eq!(RunwayLength::FloorCount.resolve(140), 140);
    }
}
