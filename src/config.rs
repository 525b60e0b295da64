//! Session configuration: grid shape, endpoints and replay pacing.
use std::time::Duration;

use crate::error::{Error, Result};
use crate::grid::Cell;
use crate::replay::Intervals;

pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 30;
pub const DEFAULT_VISIT_INTERVAL_MS: u64 = 10;
/// Slower than the visit interval so the final path stays legible.
pub const DEFAULT_PATH_INTERVAL_MS: u64 = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub rows: usize,
    pub cols: usize,
    pub start: Cell,
    pub end: Cell,
    pub visit_interval_ms: u64,
    pub path_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            start: Cell::new(0, 0),
            end: Cell::new(DEFAULT_ROWS - 1, DEFAULT_COLS - 1),
            visit_interval_ms: DEFAULT_VISIT_INTERVAL_MS,
            path_interval_ms: DEFAULT_PATH_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Sets the dimensions and moves the end to the bottom-right corner of the new shape.
    pub fn with_size(mut self, rows: usize, cols: usize) -> Config {
        self.rows = rows;
        self.cols = cols;
        self.end = Cell::new(rows.saturating_sub(1), cols.saturating_sub(1));
        self
    }
    pub fn with_start(mut self, start: Cell) -> Config {
        self.start = start;
        self
    }
    pub fn with_end(mut self, end: Cell) -> Config {
        self.end = end;
        self
    }
    pub fn with_intervals(mut self, visit_interval_ms: u64, path_interval_ms: u64) -> Config {
        self.visit_interval_ms = visit_interval_ms;
        self.path_interval_ms = path_interval_ms;
        self
    }

    pub fn intervals(&self) -> Intervals {
        Intervals {
            visit: Duration::from_millis(self.visit_interval_ms),
            path: Duration::from_millis(self.path_interval_ms),
        }
    }

    /// Checks that the grid has a positive, addressable size and that both endpoints lie inside
    /// it. Start and end may coincide; the search then finishes immediately.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "grid dimensions must be positive, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.rows.checked_mul(self.cols).is_none() {
            return Err(Error::InvalidConfiguration(format!(
                "a {}x{} grid has more cells than can be indexed",
                self.rows, self.cols
            )));
        }
        // Wall storage addresses cells with i32 coordinates.
        if i32::try_from(self.rows).is_err() || i32::try_from(self.cols).is_err() {
            return Err(Error::InvalidConfiguration(format!(
                "grid dimensions {}x{} exceed {} per side",
                self.rows,
                self.cols,
                i32::MAX
            )));
        }
        for (name, cell) in [("start", self.start), ("end", self.end)] {
            if cell.row >= self.rows || cell.col >= self.cols {
                return Err(Error::InvalidConfiguration(format!(
                    "{name} {cell} lies outside of the {}x{} grid",
                    self.rows, self.cols
                )));
            }
        }
        Ok(())
    }
}
