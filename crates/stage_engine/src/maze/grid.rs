//! Stage grid
//!
//! A fixed-size `width × height` map of [`Cell`]s addressed by integer
//! [`GridPos`] coordinates. `y` grows along the direction of travel, so row
//! `height - 1` is the far edge of a stage.

use std::collections::VecDeque;
use std::ops::Add;

/// Binary state of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Blocking cell
    #[default]
    Wall,
    /// Walkable cell
    Floor,
}

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridPos {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl GridPos {
    /// Create a coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Half of a step vector, i.e. the cell between two lattice cells
    pub const fn half(self) -> Self {
        Self::new(self.x / 2, self.y / 2)
    }

    /// The four cardinal neighbours at distance one
    pub const fn neighbours(self) -> [Self; 4] {
        [
            Self::new(self.x, self.y + 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y - 1),
            Self::new(self.x - 1, self.y),
        ]
    }
}

impl Add for GridPos {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row-major stage grid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-wall grid; dimensions are raised to at least one
    ///
    /// Callers bound the dimensions first, see [`CarveRequest::validate`].
    ///
    /// [`CarveRequest::validate`]: crate::maze::CarveRequest::validate
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `pos` lies inside the grid
    pub fn contains(&self, pos: GridPos) -> bool {
        self.index(pos).is_some()
    }

    /// Whether `pos` lies strictly inside the border
    pub fn is_interior(&self, pos: GridPos) -> bool {
        pos.x > 0 && pos.y > 0 && (pos.x as i64) < self.width as i64 - 1 && (pos.y as i64) < self.height as i64 - 1
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    fn position(&self, index: usize) -> GridPos {
        GridPos::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Cell at `pos`, `None` outside the grid
    pub fn get(&self, pos: GridPos) -> Option<Cell> {
        self.index(pos).map(|index| self.cells[index])
    }

    /// Overwrite the cell at `pos`; returns `false` outside the grid
    pub fn set(&mut self, pos: GridPos, cell: Cell) -> bool {
        match self.index(pos) {
            Some(index) => {
                self.cells[index] = cell;
                true
            }
            None => false,
        }
    }

    /// Whether `pos` is a floor cell
    pub fn is_floor(&self, pos: GridPos) -> bool {
        self.get(pos) == Some(Cell::Floor)
    }

    /// Number of floor cells
    pub fn floor_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Floor).count()
    }

    /// Iterate all cells row by row, starting at row 0
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(index, cell)| {
            (self.position(index), *cell)
        })
    }

    /// Mark every floor cell 4-connected to `start`
    ///
    /// Returns a row-major mask; all `false` when `start` is not a floor cell.
    pub fn flood_fill(&self, start: GridPos) -> Vec<bool> {
        let mut reached = vec![false; self.cells.len()];
        if !self.is_floor(start) {
            return reached;
        }

        let mut queue = VecDeque::from([start]);
        if let Some(index) = self.index(start) {
            reached[index] = true;
        }

        while let Some(current) = queue.pop_front() {
            for next in current.neighbours() {
                if let Some(index) = self.index(next) {
                    if !reached[index] && self.cells[index] == Cell::Floor {
                        reached[index] = true;
                        queue.push_back(next);
                    }
                }
            }
        }

        reached
    }

    /// Whether every floor cell is reachable from `start`
    pub fn is_connected_from(&self, start: GridPos) -> bool {
        let reached = self.flood_fill(start);
        self.cells
            .iter()
            .zip(reached)
            .all(|(cell, reached)| *cell == Cell::Wall || reached)
    }

    /// Shortest run of cells joining the floor region of `from` to the floor region of `to`
    ///
    /// Only cells accepted by `passable` may be crossed. Returns the cells to
    /// open, empty when the regions already touch, and `None` when no such
    /// run exists.
    pub fn bridge(&self, from: GridPos, to: GridPos, passable: impl Fn(GridPos) -> bool) -> Option<Vec<GridPos>> {
        let source = self.flood_fill(from);
        let target = self.flood_fill(to);
        if source.iter().zip(&target).any(|(source, target)| *source && *target) {
            return Some(Vec::new());
        }

        let mut seen = source.clone();
        let mut parent: Vec<Option<usize>> = vec![None; self.cells.len()];
        let mut queue: VecDeque<usize> = (0..self.cells.len()).filter(|&index| source[index]).collect();

        while let Some(index) = queue.pop_front() {
            for next in self.position(index).neighbours() {
                let Some(next_index) = self.index(next) else { continue };
                if seen[next_index] {
                    continue;
                }

                if target[next_index] {
                    let mut path = Vec::new();
                    let mut cursor = Some(index);
                    while let Some(step) = cursor.filter(|&step| !source[step]) {
                        path.push(self.position(step));
                        cursor = parent[step];
                    }
                    return Some(path);
                }

                if passable(next) {
                    seen[next_index] = true;
                    parent[next_index] = Some(index);
                    queue.push_back(next_index);
                }
            }
        }

        None
    }

    /// Text rendering, far edge on top: `#` wall, `.` floor
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(match self.cells[y * self.width + x] {
                    Cell::Wall => '#',
                    Cell::Floor => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_wall() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.floor_count(), 0);
        assert!(grid.iter().all(|(_, cell)| cell == Cell::Wall));
    }

    #[test]
    fn test_zero_dimensions_are_raised() {
        let grid = Grid::new(0, 0);
        assert_eq!((grid.width(), grid.height()), (1, 1));
    }

    #[test]
    fn test_set_outside_is_rejected() {
        let mut grid = Grid::new(3, 3);
        assert!(!grid.set(GridPos::new(-1, 0), Cell::Floor));
        assert!(!grid.set(GridPos::new(3, 1), Cell::Floor));
        assert!(grid.set(GridPos::new(2, 2), Cell::Floor));
        assert_eq!(grid.floor_count(), 1);
    }

    #[test]
    fn test_interior_excludes_border() {
        let grid = Grid::new(5, 4);
        assert!(grid.is_interior(GridPos::new(1, 1)));
        assert!(grid.is_interior(GridPos::new(3, 2)));
        assert!(!grid.is_interior(GridPos::new(0, 2)));
        assert!(!grid.is_interior(GridPos::new(4, 2)));
        assert!(!grid.is_interior(GridPos::new(2, 3)));
    }

    #[test]
    fn test_flood_fill_ignores_diagonals() {
        let mut grid = Grid::new(3, 3);
        grid.set(GridPos::new(0, 0), Cell::Floor);
        grid.set(GridPos::new(1, 1), Cell::Floor);
        assert!(!grid.is_connected_from(GridPos::new(0, 0)));

        grid.set(GridPos::new(1, 0), Cell::Floor);
        assert!(grid.is_connected_from(GridPos::new(0, 0)));
    }

    #[test]
    fn test_bridge_opens_the_shortest_gap() {
        let mut grid = Grid::new(5, 3);
        grid.set(GridPos::new(1, 1), Cell::Floor);
        grid.set(GridPos::new(3, 1), Cell::Floor);
        grid.set(GridPos::new(3, 2), Cell::Floor);

        let path = grid.bridge(GridPos::new(3, 2), GridPos::new(1, 1), |pos| grid.is_interior(pos));
        assert_eq!(path, Some(vec![GridPos::new(2, 1)]));
    }

    #[test]
    fn test_bridge_between_touching_regions_is_empty() {
        let mut grid = Grid::new(3, 3);
        grid.set(GridPos::new(0, 0), Cell::Floor);
        grid.set(GridPos::new(1, 0), Cell::Floor);
        assert_eq!(grid.bridge(GridPos::new(0, 0), GridPos::new(1, 0), |_| false), Some(Vec::new()));
    }

    #[test]
    fn test_bridge_respects_passable() {
        let mut grid = Grid::new(3, 3);
        grid.set(GridPos::new(0, 0), Cell::Floor);
        grid.set(GridPos::new(2, 2), Cell::Floor);
        assert_eq!(grid.bridge(GridPos::new(0, 0), GridPos::new(2, 2), |_| false), None);

        let path = grid.bridge(GridPos::new(0, 0), GridPos::new(2, 2), |_| true).unwrap();
        assert_eq!(path.len(), 3);
        for pos in path {
            grid.set(pos, Cell::Floor);
        }
        assert!(grid.is_connected_from(GridPos::new(0, 0)));
    }

    #[test]
    fn test_ascii_puts_far_edge_first() {
        let mut grid = Grid::new(2, 2);
        grid.set(GridPos::new(0, 1), Cell::Floor);
        assert_eq!(grid.to_ascii(), ".#\n##\n");
    }
}
