use core::fmt;
use std::cmp::Ordering;
use std::str::FromStr;

use grid_util::grid::{BoolGrid, ValueGrid};
use grid_util::point::Point;
use itertools::iproduct;
use log::{debug, info};
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::config::Config;
use crate::error::{Error, Result};

/// Position of a single square on the grid. Ordering is row-major, which is also the order in
/// which the search breaks ties between cells at equal distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Cell {
        Cell { row, col }
    }
    /// Number of axis-aligned steps between two cells.
    pub fn manhattan_distance(&self, other: &Cell) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Cell {
        Cell::new(row, col)
    }
}

/// [Grid] holds the persistent state edited by the user: a rectangular set of wall flags
/// together with one fixed start and one fixed end cell. It carries no search state, so any
/// number of searches can borrow it without affecting one another.
///
/// Walls are stored in a [BoolGrid] whose width is the number of columns and whose height is the
/// number of rows, so a [Cell] maps to the [Point] `(col, row)`. Cells are also given a dense
/// row-major index, which is what searches key their state by.
///
/// Start and end are never walls; edits targeting them are silently ignored.
#[derive(Clone, Debug)]
pub struct Grid {
    walls: BoolGrid,
    start: Cell,
    end: Cell,
}

impl Grid {
    /// Allocates an open `rows` x `cols` grid with the given endpoints.
    pub fn new(rows: usize, cols: usize, start: Cell, end: Cell) -> Result<Grid> {
        Config::default()
            .with_size(rows, cols)
            .with_start(start)
            .with_end(end)
            .validate()?;
        debug!("Creating {rows}x{cols} grid from {start} to {end}");
        Ok(Grid {
            walls: BoolGrid::new(cols, rows, false),
            start,
            end,
        })
    }

    pub fn from_config(config: &Config) -> Result<Grid> {
        Grid::new(config.rows, config.cols, config.start, config.end)
    }

    pub fn rows(&self) -> usize {
        self.walls.height
    }
    pub fn cols(&self) -> usize {
        self.walls.width
    }
    pub fn start(&self) -> Cell {
        self.start
    }
    pub fn end(&self) -> Cell {
        self.end
    }
    /// Total number of cells, walls included.
    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows() && cell.col < self.cols()
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::OutOfBounds {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    fn check_bounds(&self, cell: Cell) -> Result<Point> {
        if self.contains(cell) {
            Ok(point_of(cell))
        } else {
            Err(self.out_of_bounds(cell.row, cell.col))
        }
    }

    /// Dense row-major id of `cell`.
    pub fn index_of(&self, cell: Cell) -> Result<usize> {
        self.check_bounds(cell).map(|_| self.ix(cell))
    }
    /// Inverse of [index_of](Self::index_of).
    pub fn cell_at(&self, index: usize) -> Result<Cell> {
        if index < self.cell_count() {
            Ok(self.cell_at_ix(index))
        } else {
            Err(self.out_of_bounds(index / self.cols(), index % self.cols()))
        }
    }
    pub(crate) fn ix(&self, cell: Cell) -> usize {
        cell.row * self.cols() + cell.col
    }
    pub(crate) fn cell_at_ix(&self, index: usize) -> Cell {
        Cell::new(index / self.cols(), index % self.cols())
    }

    pub fn is_start(&self, cell: Cell) -> bool {
        cell == self.start
    }
    pub fn is_end(&self, cell: Cell) -> bool {
        cell == self.end
    }
    pub fn is_wall(&self, cell: Cell) -> Result<bool> {
        self.check_bounds(cell).map(|p| self.walls.get_point(p))
    }
    /// Wall flag of a cell already known to be in bounds.
    fn blocked(&self, cell: Cell) -> bool {
        self.walls.get_point(point_of(cell))
    }
    pub(crate) fn is_wall_ix(&self, index: usize) -> bool {
        self.blocked(self.cell_at_ix(index))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        iproduct!(0..self.rows(), 0..self.cols()).map(|(row, col)| Cell::new(row, col))
    }

    pub fn walls(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(|c| self.blocked(*c))
    }

    /// The in-bounds cells above, below, left and right of `cell`, in that order. A cell outside
    /// of the grid has no neighbours.
    pub fn neighbours(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        if !self.contains(cell) {
            return SmallVec::new();
        }
        let mut neighbours: SmallVec<[Cell; 4]> = point_of(cell)
            .neumann_neighborhood_smallvec()
            .into_iter()
            .filter(|p| self.walls.point_in_bounds(*p))
            .map(cell_of)
            .collect();
        neighbours.sort_unstable_by_key(|n| direction_rank(cell, *n));
        neighbours
    }

    /// Flips the wall flag of `cell` and returns whether anything changed. Toggling the start or
    /// end is a no-op.
    pub fn toggle_wall(&mut self, cell: Cell) -> Result<bool> {
        let p = self.check_bounds(cell)?;
        if self.is_start(cell) || self.is_end(cell) {
            debug!("Ignoring wall toggle on endpoint {cell}");
            return Ok(false);
        }
        let blocked = self.walls.get_point(p);
        self.walls.set(p.x, p.y, !blocked);
        Ok(true)
    }

    /// Returns a copy of the grid with the wall at `cell` toggled, leaving `self` untouched.
    pub fn with_wall_toggled(&self, cell: Cell) -> Result<Grid> {
        let mut grid = self.clone();
        grid.toggle_wall(cell)?;
        Ok(grid)
    }

    /// Sets the wall flag of `cell` and returns whether anything changed. Useful for
    /// drag-painting, where the same cell is hit repeatedly.
    pub fn set_wall(&mut self, cell: Cell, blocked: bool) -> Result<bool> {
        let p = self.check_bounds(cell)?;
        if self.is_start(cell) || self.is_end(cell) || self.walls.get_point(p) == blocked {
            return Ok(false);
        }
        self.walls.set(p.x, p.y, blocked);
        Ok(true)
    }

    pub fn clear_walls(&mut self) {
        self.walls = BoolGrid::new(self.cols(), self.rows(), false);
    }

    /// Bypasses the endpoint protection so searches can be checked against walled endpoints.
    #[cfg(test)]
    pub(crate) fn force_wall(&mut self, cell: Cell) {
        let p = point_of(cell);
        self.walls.set(p.x, p.y, true);
    }

    /// Generates a [UnionFind] structure linking every open cell to its open 4-neighbours.
    pub fn components(&self) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.cell_count());
        for cell in self.cells() {
            if self.blocked(cell) {
                continue;
            }
            // Linking down and right is enough to cover every edge once.
            let down = Cell::new(cell.row + 1, cell.col);
            let right = Cell::new(cell.row, cell.col + 1);
            for n in [down, right] {
                if self.contains(n) && !self.blocked(n) {
                    components.union(self.ix(cell), self.ix(n));
                }
            }
        }
        components
    }

    /// Checks if the end lies on the same connected component as the start.
    pub fn reachable(&self) -> bool {
        if self.blocked(self.start) || self.blocked(self.end) {
            return false;
        }
        let reachable = self
            .components()
            .equiv(self.ix(self.start), self.ix(self.end));
        if !reachable {
            info!("{} is not reachable from {}", self.end, self.start);
        }
        reachable
    }
}

/// Only the wall layout and the endpoints take part in equality.
impl PartialEq for Grid {
    fn eq(&self, other: &Grid) -> bool {
        self.rows() == other.rows()
            && self.cols() == other.cols()
            && self.start == other.start
            && self.end == other.end
            && self.walls().eq(other.walls())
    }
}

impl Eq for Grid {}

/// Dimensions are validated to fit in `i32`, so the casts are lossless for in-bounds cells.
fn point_of(cell: Cell) -> Point {
    Point::new(cell.col as i32, cell.row as i32)
}

fn cell_of(point: Point) -> Cell {
    Cell::new(point.y as usize, point.x as usize)
}

/// Position of the neighbour `n` in up, down, left, right order.
fn direction_rank(cell: Cell, n: Cell) -> u8 {
    match (n.row.cmp(&cell.row), n.col.cmp(&cell.col)) {
        (Ordering::Less, _) => 0,
        (Ordering::Greater, _) => 1,
        (_, Ordering::Less) => 2,
        _ => 3,
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                let cell = Cell::new(row, col);
                let c = if self.is_start(cell) {
                    'S'
                } else if self.is_end(cell) {
                    'E'
                } else if self.blocked(cell) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parses the format produced by [Display](fmt::Display): one line per row made of `.`, `#`,
/// `S` and `E`, with exactly one `S` and one `E`.
impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Grid> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.chars().count());
        let mut start = None;
        let mut end = None;
        let mut walls = Vec::new();
        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(Error::InvalidConfiguration(format!(
                    "row {row} has {} cells, expected {cols}",
                    line.chars().count()
                )));
            }
            for (col, c) in line.chars().enumerate() {
                let slot = match c {
                    'S' => &mut start,
                    'E' => &mut end,
                    '.' => continue,
                    '#' => {
                        walls.push(Cell::new(row, col));
                        continue;
                    }
                    other => {
                        return Err(Error::InvalidConfiguration(format!(
                            "unexpected character {other:?} at ({row}, {col})"
                        )))
                    }
                };
                if slot.replace(Cell::new(row, col)).is_some() {
                    return Err(Error::InvalidConfiguration(format!(
                        "duplicate {c} marker at ({row}, {col})"
                    )));
                }
            }
        }
        let (Some(start), Some(end)) = (start, end) else {
            return Err(Error::InvalidConfiguration(
                "grid needs exactly one S and one E".to_owned(),
            ));
        };
        let mut grid = Grid::new(rows, cols, start, end)?;
        for cell in walls {
            grid.set_wall(cell, true)?;
        }
        Ok(grid)
    }
}
