//! Level composition and orchestration
//!
//! - [`composer`]: carves every stage and furnishes cells, fences and the
//!   runway from the pool
//! - [`layout`]: markers and runway geometry published after a generation
//! - [`progress`]: brick tally and stage gate consumed by gameplay
//! - [`orchestrator`]: sequences level changes and notifies collaborators

pub mod composer;
pub mod layout;
pub mod orchestrator;
pub mod progress;

#[cfg(test)]
mod tests;

pub use composer::{LevelError, StageComposer, StagePlacement};
pub use layout::{LevelLayout, RunwayMarkers, StageMarkers};
pub use orchestrator::{LevelCollaborator, LevelOrchestrator, RunContext};
pub use progress::{Advance, BrickTally, Direction, RunwayOutcome, StageProgress, MARKER_TOLERANCE};
