//! Stage composer
//!
//! Turns carved grids into placed instances. For every stage the composer
//! carves a grid, furnishes each cell from the pool (floor flush, wall raised
//! slightly), records the start and end markers, and closes the stage with a
//! fence row. After the final stage it lays the runway: one line and one
//! brick per step and a win-position marker beyond the last step.
//!
//! ```text
//!  z ▲
//!    │  [W] ░░░░░░░░░░░░░░ [W]      fence: win triggers + filler
//!    │      ##.###########
//!    │      ##.....#.....#          stage grid, height rows
//!    │      ##.###.#.###.#
//!    │      ##....S......#
//!    └──────────────────────▶ x
//! ```
//!
//! Every instance acquired since the last generation is tracked per stage so
//! that [`StageComposer::clear_level`] can hand all of them back.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::LevelConfig;
use crate::foundation::math::{euler_degrees, up, Quat, Vec3};
use crate::level::layout::{LevelLayout, RunwayMarkers, StageMarkers};
use crate::maze::{mid_column, CarveRequest, Cell, Grid, GridPos, MazeError, MIN_DIMENSION};
use crate::pool::{InstanceHandle, InstancePool, ResourceKind};

/// Height walls are raised above the floor plane
const WALL_LIFT: f32 = 0.1;

/// Height bricks rest above their runway line
const BRICK_LIFT: f32 = 0.1;

/// Errors that abort a level generation
///
/// All of them are detected before the previous level is cleared, so a
/// failed generation leaves the committed level untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    /// Stage grid too small to carve
    #[error("stage grid {width}x{height} is too small (minimum 3x3)")]
    DegenerateGrid {
        /// Configured width
        width: usize,
        /// Configured height
        height: usize,
    },

    /// Configuration values that cannot describe a level
    #[error("invalid level configuration: {0}")]
    InvalidConfig(String),

    /// Carving rejected its request
    #[error(transparent)]
    Carve(#[from] MazeError),
}

/// Instances placed for one stage (or the runway), in placement order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagePlacement {
    instances: Vec<(ResourceKind, InstanceHandle)>,
    skipped: usize,
}

impl StagePlacement {
    /// Acquire one instance and track it; a refused acquisition is counted
    /// and skipped
    fn place<P: InstancePool + ?Sized>(
        &mut self,
        pool: &mut P,
        kind: ResourceKind,
        position: Vec3,
        rotation: Quat,
    ) -> Option<InstanceHandle> {
        match pool.acquire(kind, position, rotation) {
            Ok(handle) => {
                self.instances.push((kind, handle));
                Some(handle)
            }
            Err(err) => {
                log::debug!("Skipped {} at {:?}: {}", kind, position, err);
                self.skipped += 1;
                None
            }
        }
    }

    /// Number of placed instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether nothing was placed
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Placements the pool refused
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Placed maze cells, floor and wall
    pub fn cell_count(&self) -> usize {
        self.instances.iter().filter(|(kind, _)| kind.is_maze_cell()).count()
    }

    /// Placed instances of `kind`
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.instances.iter().filter(|(placed, _)| *placed == kind).count()
    }

    /// Iterate placed instances with their kind
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, InstanceHandle)> + '_ {
        self.instances.iter().copied()
    }
}

/// A stage grid carved ahead of placement
struct CarvedStage {
    seed: u32,
    grid: Grid,
    start: GridPos,
    end: GridPos,
}

/// Lays out whole levels through an [`InstancePool`]
pub struct StageComposer<P: InstancePool> {
    pool: P,
    config: LevelConfig,
    seed_source: ChaCha8Rng,
    grids: Vec<Grid>,
    placements: Vec<StagePlacement>,
    layout: LevelLayout,
}

impl<P: InstancePool> StageComposer<P> {
    /// Create a composer drawing fresh stage seeds from entropy
    ///
    /// Registers one pool per [`ResourceKind`] with the configured sizing.
    pub fn new(pool: P, config: LevelConfig) -> Self {
        Self::with_seed_source(pool, config, ChaCha8Rng::from_entropy())
    }

    /// Create a composer drawing fresh stage seeds from `seed_source`
    ///
    /// Fresh seeds are only drawn when `random_seed` is 0.
    pub fn with_seed_source(mut pool: P, config: LevelConfig, seed_source: ChaCha8Rng) -> Self {
        register_pools(&mut pool, &config);
        Self {
            pool,
            config,
            seed_source,
            grids: Vec::new(),
            placements: Vec::new(),
            layout: LevelLayout::default(),
        }
    }

    /// Current configuration
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Replace the configuration used by the next generation
    ///
    /// Pool sizing only applies to kinds that are not registered yet.
    pub fn set_config(&mut self, config: LevelConfig) {
        register_pools(&mut self.pool, &config);
        self.config = config;
    }

    /// Underlying pool
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Underlying pool, mutably
    pub fn pool_mut(&mut self) -> &mut P {
        &mut self.pool
    }

    /// Layout of the committed level; empty after a clear
    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    /// Carved grids of the committed level, in stage order
    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    /// Per-stage placements of the committed level; the runway comes last
    pub fn placements(&self) -> &[StagePlacement] {
        &self.placements
    }

    /// Instances currently held by the committed level
    pub fn placed_count(&self) -> usize {
        self.placements.iter().map(StagePlacement::len).sum()
    }

    /// Generate a full level, replacing the committed one
    ///
    /// Every stage is carved and the configuration checked before anything
    /// is released, so on error the previous level stays in place.
    pub fn generate_level(&mut self) -> Result<&LevelLayout, LevelError> {
        let carved = self.carve_stages()?;
        self.clear_level();

        let cell_size = self.config.cell_size;
        let mut offset = Vec3::zeros();
        let mut layout = LevelLayout::default();

        for (index, stage) in carved.into_iter().enumerate() {
            let mut placement = StagePlacement::default();
            let markers = self.place_stage(index + 1, &stage, offset, &mut placement);
            self.place_fence(offset, markers.fence_z, &mut placement);

            log::info!("Stage {} generated with {} floor cells (seed {}, {} placements skipped)",
                       markers.stage_index, markers.floor_count, markers.seed, placement.skipped());

            offset.z = markers.fence_z + cell_size;
            layout.stages.push(markers);
            self.grids.push(stage.grid);
            self.placements.push(placement);
        }

        if let Some(last) = layout.stages.last() {
            let mut placement = StagePlacement::default();
            layout.runway = Some(self.place_runway(last, &mut placement));
            layout.brick_threshold = self.config.brick_threshold(last.floor_count);
            self.placements.push(placement);
        }

        log::info!("Level ready: {} stages, brick threshold {}, {} instances placed",
                   layout.stage_count(), layout.brick_threshold, self.placed_count());

        self.layout = layout;
        Ok(&self.layout)
    }

    /// Release every instance of the committed level and forget its markers
    ///
    /// Calling it again with nothing committed is a no-op.
    pub fn clear_level(&mut self) {
        let placements = std::mem::take(&mut self.placements);
        let mut released = 0usize;

        for placement in placements {
            for (kind, handle) in placement.instances {
                match self.pool.release(kind, handle) {
                    Ok(()) => released += 1,
                    Err(err) => log::warn!("Could not return {:?} to pool {}: {}", handle, kind, err),
                }
            }
        }

        self.grids.clear();
        self.layout = LevelLayout::default();

        if released > 0 {
            log::debug!("Cleared level, {} instances returned to the pool", released);
        }
    }

    /// Validate the configuration and carve every stage grid
    fn carve_stages(&mut self) -> Result<Vec<CarvedStage>, LevelError> {
        let width = self.config.width;
        let height = self.config.height;
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Err(LevelError::DegenerateGrid { width, height });
        }
        self.config.validate().map_err(LevelError::InvalidConfig)?;

        let mid_x = mid_column(width);
        let desired_end = GridPos::new(mid_x, (height as i32 - 2).max(0));
        let end = GridPos::new(mid_x, height as i32 - 1);

        let mut carved = Vec::with_capacity(self.config.total_stages);
        for stage in 1..=self.config.total_stages {
            let seed = self.stage_seed(stage);
            let start_row = if stage == 1 { 1 } else { 0 };
            let start = GridPos::new(mid_x, start_row);

            let grid = CarveRequest::new(width, height, seed, start, desired_end).carve()?;
            carved.push(CarvedStage { seed, grid, start, end });
        }

        Ok(carved)
    }

    /// Base seed plus 100 per stage, or a fresh seed when the base is 0
    fn stage_seed(&mut self, stage: usize) -> u32 {
        if self.config.random_seed != 0 {
            self.config.random_seed.wrapping_add((stage as i32).wrapping_mul(100)) as u32
        } else {
            self.seed_source.gen_range(1..i32::MAX) as u32
        }
    }

    /// Furnish every cell of one stage grid
    fn place_stage(
        &mut self,
        stage_index: usize,
        stage: &CarvedStage,
        offset: Vec3,
        placement: &mut StagePlacement,
    ) -> StageMarkers {
        let cell_size = self.config.cell_size;
        let world = |pos: GridPos| offset + Vec3::new(pos.x as f32 * cell_size, 0.0, pos.y as f32 * cell_size);

        let mut start_handle = None;
        let mut end_handle = None;

        for (pos, cell) in stage.grid.iter() {
            let (kind, position) = match cell {
                Cell::Floor => (ResourceKind::Floor, world(pos)),
                Cell::Wall => (ResourceKind::Wall, world(pos) + up() * WALL_LIFT),
            };

            let handle = placement.place(&mut self.pool, kind, position, Quat::identity());
            if pos == stage.start {
                start_handle = handle;
            }
            if pos == stage.end {
                end_handle = handle;
            }
        }

        StageMarkers {
            stage_index,
            seed: stage.seed,
            start_handle,
            end_handle,
            start_cell: stage.start,
            end_cell: stage.end,
            start_position: world(stage.start),
            end_position: world(stage.end),
            offset,
            fence_z: offset.z + stage.grid.height() as f32 * cell_size,
            floor_count: stage.grid.floor_count(),
        }
    }

    /// Close a stage with a fence row one cell wider than the grid on each side
    fn place_fence(&mut self, offset: Vec3, fence_z: f32, placement: &mut StagePlacement) {
        let cell_size = self.config.cell_size;
        let fence_width = self.config.width + 2;
        let filler_rotation = euler_degrees(-90.0, 0.0, 0.0);

        for i in 0..fence_width {
            let position = Vec3::new(offset.x + (i as f32 - 1.0) * cell_size, offset.y, fence_z);
            if i == 0 || i == fence_width - 1 {
                let raised = position + up() * self.config.win_prefab_height;
                placement.place(&mut self.pool, ResourceKind::WinTrigger, raised, Quat::identity());
            } else {
                placement.place(&mut self.pool, ResourceKind::FenceFiller, position, filler_rotation);
            }
        }
    }

    /// Lay the runway past the final fence, centred on the last end marker
    fn place_runway(&mut self, last: &StageMarkers, placement: &mut StagePlacement) -> RunwayMarkers {
        if last.end_handle.is_none() {
            log::warn!("Stage {} has no furnished end marker, centring the runway on its cell", last.stage_index);
        }

        let cell_size = self.config.cell_size;
        let height = self.config.runway_height;
        let center_x = last.end_position.x;
        let start_z = last.fence_z + cell_size;
        let steps = self.config.runway_length.resolve(last.floor_count);

        let mut runway = RunwayMarkers {
            center_x,
            height,
            start_z,
            step_size: cell_size,
            steps,
            win_position: Vec3::new(center_x, height, start_z + steps as f32 * cell_size),
            win_handle: None,
        };

        let line_rotation = euler_degrees(-90.0, 0.0, 0.0);
        for step in 0..steps {
            let position = runway.step_position(step);
            placement.place(&mut self.pool, ResourceKind::Line, position, line_rotation);
            placement.place(&mut self.pool, ResourceKind::Brick, position + up() * BRICK_LIFT, Quat::identity());
        }

        runway.win_handle = placement.place(&mut self.pool, ResourceKind::WinPosition, runway.win_position, Quat::identity());

        log::debug!("Runway of {} steps at x {} from z {}", steps, center_x, start_z);
        runway
    }
}

/// Register one pool per kind with the configured sizing
fn register_pools<P: InstancePool + ?Sized>(pool: &mut P, config: &LevelConfig) {
    for &kind in ResourceKind::all() {
        let sizing = config.pools.sizing(kind);
        pool.create_pool(kind, sizing.initial_size, sizing.max_size);
    }
}
