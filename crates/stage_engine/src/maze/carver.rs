//! Seeded maze carving
//!
//! Randomized depth-first carve with backtracking on a half-resolution
//! lattice. Starting from `start`, the carver repeatedly looks at the top of
//! an explicit stack, tries the four lattice steps of length two in a seeded
//! shuffled order, and opens both the wall cell in between and the target
//! cell for the first step that lands on an unvisited interior cell. When no
//! step is possible the cell is popped. Corridors are exactly one cell wide
//! and every carved cell is reachable from `start`.
//!
//! After carving, the top-row exit above `desired_end` and `start` itself
//! are forced open, and the column under the exit is opened down to the
//! first floor cell. When that column runs between lattice columns and
//! misses the maze, the shortest interior run of walls joining the two is
//! opened as well, so every floor cell is reachable from `start`.
//!
//! Identical requests always produce identical grids; the only source of
//! randomness is a ChaCha generator seeded from the request.

use crate::maze::grid::{Cell, Grid, GridPos};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Smallest width and height that can hold a start, an interior lattice
/// cell and an exit
pub const MIN_DIMENSION: usize = 3;

/// Largest width and height a grid may have
pub const MAX_DIMENSION: usize = 4096;

/// Lattice steps in their unshuffled order
const LATTICE_STEPS: [GridPos; 4] = [
    GridPos::new(0, 2),
    GridPos::new(2, 0),
    GridPos::new(0, -2),
    GridPos::new(-2, 0),
];

/// Errors detected before carving starts
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Grid too small to carve a start→end path
    #[error("grid {width}x{height} is too small to carve (minimum 3x3)")]
    DegenerateGrid {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// Grid larger than [`MAX_DIMENSION`] on either side
    #[error("grid {width}x{height} exceeds the 4096x4096 limit")]
    Oversized {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// A designated cell lies outside the grid
    #[error("{what} {pos} lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Which designated cell
        what: &'static str,
        /// Offending coordinate
        pos: GridPos,
        /// Grid width
        width: usize,
        /// Grid height
        height: usize,
    },
}

/// Column every stage carves its vertical spine through
///
/// `width / 2 - 1` for even widths and `width / 2` for odd ones. Fence and
/// runway centering rely on all stages agreeing on it.
pub fn mid_column(width: usize) -> i32 {
    let mid = if width % 2 == 0 { (width / 2).saturating_sub(1) } else { width / 2 };
    i32::try_from(mid).unwrap_or(i32::MAX)
}

/// Parameters of one carve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarveRequest {
    /// Grid width
    pub width: usize,
    /// Grid height
    pub height: usize,
    /// Generator seed
    pub seed: u32,
    /// First carved cell
    pub start: GridPos,
    /// Cell at which the carve stops extending its current branch
    pub desired_end: GridPos,
}

impl CarveRequest {
    /// Request carving a `width × height` grid
    pub fn new(width: usize, height: usize, seed: u32, start: GridPos, desired_end: GridPos) -> Self {
        Self { width, height, seed, start, desired_end }
    }

    /// Top-row cell forced open above `desired_end`
    pub fn exit(&self) -> GridPos {
        let top = i32::try_from(self.height).unwrap_or(i32::MAX);
        GridPos::new(self.desired_end.x, top - 1)
    }

    /// Reject grids and designated cells that cannot be carved
    pub fn validate(&self) -> Result<(), MazeError> {
        if self.width < MIN_DIMENSION || self.height < MIN_DIMENSION {
            return Err(MazeError::DegenerateGrid { width: self.width, height: self.height });
        }

        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(MazeError::Oversized { width: self.width, height: self.height });
        }

        for (what, pos) in [("start", self.start), ("desired end", self.desired_end)] {
            if !self.contains(pos) {
                return Err(MazeError::OutOfBounds { what, pos, width: self.width, height: self.height });
            }
        }

        Ok(())
    }

    fn contains(&self, pos: GridPos) -> bool {
        let column = usize::try_from(pos.x).is_ok_and(|x| x < self.width);
        let row = usize::try_from(pos.y).is_ok_and(|y| y < self.height);
        column && row
    }

    /// Carve the grid described by this request
    pub fn carve(&self) -> Result<Grid, MazeError> {
        carve(self)
    }
}

/// Carve one stage grid
pub fn carve(request: &CarveRequest) -> Result<Grid, MazeError> {
    request.validate()?;

    let mut grid = Grid::new(request.width, request.height);
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(request.seed));

    let lattice_cells = (request.width / 2) * (request.height / 2) + 1;
    let mut stack: Vec<GridPos> = Vec::with_capacity(lattice_cells);

    grid.set(request.start, Cell::Floor);
    stack.push(request.start);

    while let Some(&current) = stack.last() {
        let mut steps = LATTICE_STEPS;
        shuffle(&mut steps, &mut rng);

        let mut carved = false;
        for step in steps {
            let next = current + step;
            if !grid.is_interior(next) || grid.is_floor(next) {
                continue;
            }

            grid.set(current + step.half(), Cell::Floor);
            grid.set(next, Cell::Floor);
            stack.push(next);
            carved = true;

            if next == request.desired_end {
                stack.pop();
            }
            break;
        }

        if !carved {
            stack.pop();
        }
    }

    open_edges(&mut grid, request);

    log::trace!("Carved {}x{} grid (seed {}) with {} floor cells",
                request.width, request.height, request.seed, grid.floor_count());
    Ok(grid)
}

/// Pairwise swap shuffle: each slot trades places with a uniformly drawn one
fn shuffle(steps: &mut [GridPos; 4], rng: &mut ChaCha8Rng) {
    for i in 0..steps.len() {
        let swap = rng.gen_range(0..steps.len());
        steps.swap(i, swap);
    }
}

/// Force the exit and start open and connect the exit to the maze
fn open_edges(grid: &mut Grid, request: &CarveRequest) {
    let exit = request.exit();
    grid.set(exit, Cell::Floor);
    grid.set(request.start, Cell::Floor);

    // Top connector: open the exit column downward until it meets the maze.
    let mut below = GridPos::new(exit.x, exit.y - 1);
    while below.y > 0 && !grid.is_floor(below) {
        grid.set(below, Cell::Floor);
        below.y -= 1;
    }

    // Off-lattice exit columns can miss the maze entirely.
    let bridge = grid
        .bridge(exit, request.start, |pos| grid.is_interior(pos))
        .or_else(|| grid.bridge(exit, request.start, |_| true));
    match bridge {
        Some(path) => {
            if !path.is_empty() {
                log::trace!("Exit column {} joined to the maze through {} cells", exit.x, path.len());
            }
            for pos in path {
                grid.set(pos, Cell::Floor);
            }
        }
        None => log::warn!("Exit {} could not be joined to start {}", exit, request.start),
    }
}
