//! Error types for grid construction.

use thiserror::Error;

/// Errors that can occur when sizing a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// A bound is NaN or infinite.
    #[error("grid bounds must be finite")]
    NonFiniteBounds,

    /// `min` is not strictly below `max` on some axis.
    #[error("grid bounds are empty along axis {axis}: min {min} >= max {max}")]
    EmptyBounds {
        /// Offending axis (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// Lower bound on that axis.
        min: f64,
        /// Upper bound on that axis.
        max: f64,
    },

    /// Some axis has no cells.
    #[error("grid needs at least one cell per axis, got {0:?}")]
    NoCells([usize; 3]),

    /// The total cell count does not fit in memory arithmetic.
    #[error("grid of {0:?} cells is too large")]
    TooManyCells([usize; 3]),
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
