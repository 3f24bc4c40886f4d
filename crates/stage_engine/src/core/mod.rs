//! # Core Module
//!
//! Shared configuration consumed by the pool, the carver and the level
//! composer.
//!
//! ## Organization
//!
//! - **Config**: level configuration surface with per-kind pool sizing
//! - **Foundation**: math and logging utilities (re-exported for convenience)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    LevelConfig,
    PoolConfig,
    PoolSizing,
    RunwayLength,
    Config,
    ConfigError,
};
