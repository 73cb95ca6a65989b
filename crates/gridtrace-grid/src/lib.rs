#![warn(missing_docs)]

//! Uniform spatial grid for the gridtrace renderer.
//!
//! World space inside an axis-aligned box is cut into `NI × NJ × NK`
//! equal cells. Every shape is registered in each cell its bounding box
//! overlaps, stored in compressed sparse row form: `starts[c]..starts[c+1]`
//! indexes the ids of cell `c` in one flat `contents` array.
//!
//! # Architecture
//!
//! - [`GridSpec`] - bounds and cell counts, validated on construction
//! - [`UniformGrid`] - cell geometry plus the CSR membership index,
//!   rebuilt wholesale whenever shapes move
//! - [`UniformGrid::query`] - front-to-back cell walk returning the
//!   first hit that lies inside the cell being visited
//!
//! # Example
//!
//! ```ignore
//! use gridtrace_grid::{GridSpec, UniformGrid};
//!
//! let mut grid = UniformGrid::new(GridSpec::cube(10.0, 10))?;
//! grid.rebuild(&mut shapes);
//!
//! if let Some(hit) = grid.query(&ray, &shapes, f64::INFINITY) {
//!     println!("shape {} at t = {}", hit.shape, hit.t);
//! }
//! ```

pub mod error;
mod grid;
mod traverse;

pub use error::{GridError, Result};
pub use grid::{GridStats, UniformGrid};
pub use traverse::GridHit;

use gridtrace_math::Point3;
use serde::{Deserialize, Serialize};

/// Grid bounds and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Minimum world corner.
    pub min: Point3,
    /// Maximum world corner.
    pub max: Point3,
    /// Cells along x, y and z.
    pub cells: [usize; 3],
}

impl GridSpec {
    /// Grid over `[0, size]³` with `n` cells per axis.
    pub fn cube(size: f64, n: usize) -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::new(size, size, size),
            cells: [n, n, n],
        }
    }

    /// Validate bounds and cell counts.
    pub fn validate(&self) -> Result<()> {
        if self.min.iter().chain(self.max.iter()).any(|c| !c.is_finite()) {
            return Err(GridError::NonFiniteBounds);
        }
        for axis in 0..3 {
            if self.min[axis] >= self.max[axis] {
                return Err(GridError::EmptyBounds {
                    axis,
                    min: self.min[axis],
                    max: self.max[axis],
                });
            }
        }
        if self.cells.contains(&0) {
            return Err(GridError::NoCells(self.cells));
        }
        let total = self.cells[0]
            .checked_mul(self.cells[1])
            .and_then(|n| n.checked_mul(self.cells[2]))
            .and_then(|n| n.checked_add(1));
        if total.is_none() {
            return Err(GridError::TooManyCells(self.cells));
        }
        Ok(())
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells[0] * self.cells[1] * self.cells[2]
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::cube(1.0, 1)
    }
}
