//! Stage progress
//!
//! The gameplay gate that consumes a published [`LevelLayout`]: a player
//! standing on a stage's end marker and moving forward passes to the next
//! stage once enough bricks are collected, and at the final stage slides onto
//! the runway, where bricks are deposited one step at a time until the tally
//! or the runway runs out.

use crate::foundation::math::{Transform, Vec3};
use crate::level::layout::LevelLayout;

/// Distance within which a position counts as standing on a marker
pub const MARKER_TOLERANCE: f32 = 0.1;

/// Cardinal movement direction on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the next stage (+z)
    Forward,
    /// Back towards the start (-z)
    Back,
    /// -x
    Left,
    /// +x
    Right,
}

impl Direction {
    /// Unit vector of the direction
    pub fn to_vec3(self) -> Vec3 {
        match self {
            Self::Forward => Vec3::new(0.0, 0.0, 1.0),
            Self::Back => Vec3::new(0.0, 0.0, -1.0),
            Self::Left => Vec3::new(-1.0, 0.0, 0.0),
            Self::Right => Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Bricks carried by the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrickTally {
    count: usize,
}

impl BrickTally {
    /// Empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up one brick
    pub fn collect(&mut self) {
        self.count += 1;
    }

    /// Put one brick down; `false` when there was none to place
    pub fn place_one(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }

    /// Drop every carried brick
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Bricks carried
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Result of a forward move attempted from an end marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Gate passed; slide to the next stage's start marker
    NextStage {
        /// 0-based cursor of the stage entered
        stage: usize,
        /// Start marker to slide to
        target: Vec3,
    },
    /// At the gate without enough bricks
    NotEnoughBricks {
        /// Bricks carried
        have: usize,
        /// Bricks required
        need: usize,
    },
    /// Final stage cleared; slide down the runway towards its win position
    Runway {
        /// Win position beyond the last runway step
        target: Vec3,
    },
    /// Not at a gate, or not moving forward
    Blocked,
}

/// Result of one runway deposit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunwayOutcome {
    /// A brick was placed on a runway step
    Deposited {
        /// 0-based runway step
        step: usize,
        /// Where the brick now rests
        position: Vec3,
    },
    /// No brick left or no step left; the run is over
    Finished {
        /// Bricks deposited during this run
        deposited: usize,
    },
}

/// Per-run stage cursor, brick tally and runway state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageProgress {
    tally: BrickTally,
    stage: usize,
    scoring: bool,
    deposited: usize,
}

impl StageProgress {
    /// Progress at the first stage with no bricks
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over at the first stage with no bricks
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Carried bricks
    pub fn tally(&self) -> &BrickTally {
        &self.tally
    }

    /// Carried bricks, mutably
    pub fn tally_mut(&mut self) -> &mut BrickTally {
        &mut self.tally
    }

    /// 0-based cursor of the current stage
    pub fn current_stage(&self) -> usize {
        self.stage
    }

    /// Whether the player is on the runway depositing bricks
    pub fn is_scoring(&self) -> bool {
        self.scoring
    }

    /// Bricks deposited on the runway so far
    pub fn deposited(&self) -> usize {
        self.deposited
    }

    /// Whether `position` is on the end marker of stage `cursor`
    pub fn is_at_end_marker(layout: &LevelLayout, cursor: usize, position: Vec3) -> bool {
        layout
            .stage(cursor)
            .is_some_and(|stage| {
                let marker = Transform::from_position(stage.end_position);
                marker.distance_to(&Transform::from_position(position)) < MARKER_TOLERANCE
            })
    }

    /// Try to leave the current stage through its end marker
    pub fn try_advance(&mut self, layout: &LevelLayout, position: Vec3, direction: Direction) -> Advance {
        if self.scoring || direction != Direction::Forward {
            return Advance::Blocked;
        }
        if !Self::is_at_end_marker(layout, self.stage, position) {
            return Advance::Blocked;
        }

        let next = self.stage + 1;
        if let Some(next_stage) = layout.stage(next) {
            let need = layout.brick_threshold;
            if self.tally.count() < need {
                log::debug!("Stage {} gate needs {} bricks, have {}", self.stage + 1, need, self.tally.count());
                return Advance::NotEnoughBricks { have: self.tally.count(), need };
            }

            self.tally.reset();
            self.stage = next;
            log::info!("Passed to stage {}", next_stage.stage_index);
            return Advance::NextStage { stage: next, target: next_stage.start_position };
        }

        match &layout.runway {
            Some(runway) => {
                self.scoring = true;
                log::info!("Final stage cleared with {} bricks, sliding onto the runway", self.tally.count());
                Advance::Runway { target: runway.win_position }
            }
            None => Advance::Blocked,
        }
    }

    /// Deposit the next brick on the runway
    ///
    /// Returns [`RunwayOutcome::Finished`] once the tally is empty or every
    /// step holds a brick, and on every call after that.
    pub fn deposit_on_runway(&mut self, layout: &LevelLayout) -> RunwayOutcome {
        let Some(runway) = layout.runway.as_ref() else {
            return self.finish();
        };
        if !self.scoring || self.deposited >= runway.steps || !self.tally.place_one() {
            return self.finish();
        }

        let step = self.deposited;
        self.deposited += 1;
        RunwayOutcome::Deposited { step, position: runway.step_position(step) }
    }

    fn finish(&mut self) -> RunwayOutcome {
        if self.scoring {
            log::info!("Runway finished with {} bricks deposited", self.deposited);
        }
        self.scoring = false;
        RunwayOutcome::Finished { deposited: self.deposited }
    }
}
