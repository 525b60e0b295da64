//! Error types for grid construction, editing and run control.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A coordinate outside of the grid was used for access or editing.
    #[error("cell ({row}, {col}) is outside of the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Grid dimensions or start/end placement are not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A run was started, or the grid edited, while another run is still active.
    #[error("a run is already in progress")]
    ReentrantRun,
}
