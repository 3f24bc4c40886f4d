//! Published level layout
//!
//! What the composer hands to gameplay collaborators after a generation:
//! per-stage start and end markers, the brick gate and the final runway.

use crate::foundation::math::Vec3;
use crate::maze::GridPos;
use crate::pool::InstanceHandle;

/// Start and end markers of one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageMarkers {
    /// 1-based stage number
    pub stage_index: usize,
    /// Seed the stage grid was carved with
    pub seed: u32,
    /// Instance furnished at the start cell, if the pool had one
    pub start_handle: Option<InstanceHandle>,
    /// Instance furnished at the top-row exit, if the pool had one
    pub end_handle: Option<InstanceHandle>,
    /// Grid cell of the start marker
    pub start_cell: GridPos,
    /// Grid cell of the end marker
    pub end_cell: GridPos,
    /// World position of the start marker
    pub start_position: Vec3,
    /// World position of the end marker
    pub end_position: Vec3,
    /// World origin of the stage grid
    pub offset: Vec3,
    /// World z of the fence row closing the stage
    pub fence_z: f32,
    /// Floor cells in the stage grid
    pub floor_count: usize,
}

/// Final runway geometry
#[derive(Debug, Clone, PartialEq)]
pub struct RunwayMarkers {
    /// World x every runway step is centred on
    pub center_x: f32,
    /// World height of the runway
    pub height: f32,
    /// World z of the first step
    pub start_z: f32,
    /// Distance between steps
    pub step_size: f32,
    /// Number of line/brick steps
    pub steps: usize,
    /// World position of the marker beyond the last step
    pub win_position: Vec3,
    /// Instance furnished at the win position, if the pool had one
    pub win_handle: Option<InstanceHandle>,
}

impl RunwayMarkers {
    /// World position of runway step `step`
    pub fn step_position(&self, step: usize) -> Vec3 {
        Vec3::new(self.center_x, self.height, self.start_z + step as f32 * self.step_size)
    }
}

/// Everything a generated level publishes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelLayout {
    /// Stages in travel order
    pub stages: Vec<StageMarkers>,
    /// Bricks needed to pass a stage gate
    pub brick_threshold: usize,
    /// Runway after the final stage
    pub runway: Option<RunwayMarkers>,
}

impl LevelLayout {
    /// Number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Whether no level is committed
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage at 0-based `cursor`
    pub fn stage(&self, cursor: usize) -> Option<&StageMarkers> {
        self.stages.get(cursor)
    }

    /// Where a run starts: the first stage's start marker
    pub fn spawn_position(&self) -> Option<Vec3> {
        self.stages.first().map(|stage| stage.start_position)
    }

    /// Final stage
    pub fn last_stage(&self) -> Option<&StageMarkers> {
        self.stages.last()
    }
}
