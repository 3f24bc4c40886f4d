//! # Stage Engine
//!
//! Procedural level core for a maze-stage runner: seeded maze stages laid out
//! back to back, each closed by a fence, followed by a runway where collected
//! bricks are deposited.
//!
//! ## Features
//!
//! - **Object Pool**: fixed-capacity per-kind instance reuse with
//!   generational handles
//! - **Maze Carver**: deterministic depth-first carving with guaranteed
//!   connectivity from the start cell
//! - **Stage Composer**: cell, fence and runway placement with published
//!   start/end markers
//! - **Level Orchestrator**: level changes, brick gate and runway scoring
//!
//! ## Quick Start
//!
//! ```rust
//! use stage_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LevelConfig::new().with_grid(9, 9).with_seed(42);
//!     let pool = ObjectPool::new(RecordingSink::without_command_log());
//!     let mut orchestrator = LevelOrchestrator::new(StageComposer::new(pool, config));
//!
//!     let layout = orchestrator.advance_level()?;
//!     assert_eq!(layout.stage_count(), 3);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

// Core modules
pub mod core;

pub mod config;
pub mod foundation;
pub mod level;
pub mod maze;
pub mod pool;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        foundation::math::{Quat, Transform, Vec3},
        maze::{carve, CarveRequest, Cell, Grid, GridPos, MazeError},
        pool::{
            InstanceHandle, InstancePool, ObjectPool, PlacementSink, PoolError, RecordingSink, ResourceKind,
            SharedObjectPool, SinkId,
        },
        level::{
            Advance, Direction, LevelCollaborator, LevelError, LevelLayout, LevelOrchestrator, RunwayOutcome,
            StageComposer, StageMarkers, StageProgress,
        },
        core::config::{Config, LevelConfig, PoolConfig, PoolSizing, RunwayLength},
    };
}
