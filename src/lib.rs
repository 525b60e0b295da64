//! # grid_path_replay
//!
//! Shortest path search on a 2-D grid with walls, together with a timed replay of how the
//! search explored the grid. Implements
//! [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm) over a
//! 4-connected uniform-cost grid, recording the order in which cells are finalized so a view can
//! animate the exploration followed by the resulting path.
//!
//! ```
//! use grid_path_replay::{Cell, Grid, PathSearch};
//!
//! let grid: Grid = "S..\n.#.\n..E".parse().unwrap();
//! let result = PathSearch::new().run(&grid);
//! assert_eq!(result.path.len(), 5);
//! assert_eq!(result.path.first(), Some(&Cell::new(0, 0)));
//! ```
//!
//! Traces are deterministic: among cells at equal distance the one that comes first in
//! row-major order is finalized first, so identical grids always replay identically.
pub mod config;
pub mod error;
pub mod grid;
pub mod replay;
pub mod search;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use grid::{Cell, Grid};
pub use replay::{
    AnimationSequencer, CancelToken, Frame, Intervals, ReplayEvent, ReplayOutcome, ReplaySink,
    Timeline,
};
pub use search::{FrontierKind, PathSearch, SearchResult};
pub use session::{Run, Session};
