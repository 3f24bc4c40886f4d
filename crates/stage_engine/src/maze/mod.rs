//! Maze grids and the seeded carver that fills them

pub mod carver;
pub mod grid;

pub use carver::{carve, mid_column, CarveRequest, MazeError, MAX_DIMENSION, MIN_DIMENSION};
pub use grid::{Cell, Grid, GridPos};
