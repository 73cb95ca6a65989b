//! Grid geometry and CSR membership construction.

use gridtrace_geom::{bounding_box, Aabb3, CellRange, Shape};
use gridtrace_math::{Point3, Vec3};
use log::debug;

use crate::{GridSpec, Result};

/// Occupancy summary of a populated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridStats {
    /// Total (cell, shape) registrations.
    pub entries: usize,
    /// Cells holding at least one shape.
    pub occupied_cells: usize,
    /// Largest number of shapes in one cell.
    pub max_per_cell: usize,
}

/// Uniform grid over a box with a CSR index of shape ids per cell.
///
/// Cells are numbered `i + NI·(j + NJ·k)`. Shape ids are indices into the
/// shape slice the grid was last rebuilt from.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    spec: GridSpec,
    cell_size: Vec3,
    inv_cell_size: Vec3,
    starts: Vec<usize>,
    contents: Vec<usize>,
}

impl UniformGrid {
    /// Size an empty grid. No shapes are registered until [`rebuild`].
    ///
    /// [`rebuild`]: UniformGrid::rebuild
    pub fn new(spec: GridSpec) -> Result<Self> {
        spec.validate()?;
        let extent = spec.max - spec.min;
        let cell_size = Vec3::new(
            extent.x / spec.cells[0] as f64,
            extent.y / spec.cells[1] as f64,
            extent.z / spec.cells[2] as f64,
        );
        Ok(Self {
            spec,
            cell_size,
            inv_cell_size: cell_size.map(|h| 1.0 / h),
            starts: vec![0; spec.cell_count() + 1],
            contents: Vec::new(),
        })
    }

    /// The grid's specification.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// World-space bounds of the whole grid.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::new(self.spec.min, self.spec.max)
    }

    /// Cell counts along each axis.
    pub fn dims(&self) -> [usize; 3] {
        self.spec.cells
    }

    /// Edge lengths of one cell.
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Cell containing `p`, clamped into the index range.
    pub fn cell_index(&self, p: &Point3) -> [usize; 3] {
        let mut cell = [0; 3];
        for (axis, c) in cell.iter_mut().enumerate() {
            let f = ((p[axis] - self.spec.min[axis]) * self.inv_cell_size[axis]).floor();
            let top = (self.spec.cells[axis] - 1) as f64;
            // `as` maps NaN to 0.
            *c = f.clamp(0.0, top) as usize;
        }
        cell
    }

    /// Whether `cell` lies inside the grid's index range.
    #[inline]
    pub fn contains_cell(&self, cell: [usize; 3]) -> bool {
        cell.iter().zip(self.spec.cells).all(|(&c, n)| c < n)
    }

    /// Row-major linear index of a cell. `cell` must be in range.
    #[inline]
    pub fn linear_index(&self, cell: [usize; 3]) -> usize {
        let [ni, nj, _] = self.spec.cells;
        cell[0] + ni * (cell[1] + nj * cell[2])
    }

    /// World-space box of a cell.
    pub fn cell_bounds(&self, cell: [usize; 3]) -> Aabb3 {
        let lo = Point3::new(
            self.spec.min.x + cell[0] as f64 * self.cell_size.x,
            self.spec.min.y + cell[1] as f64 * self.cell_size.y,
            self.spec.min.z + cell[2] as f64 * self.cell_size.z,
        );
        Aabb3::new(lo, lo + self.cell_size)
    }

    /// Cells overlapped by a world box, clamped to the grid.
    pub fn cell_range(&self, world: &Aabb3) -> CellRange {
        CellRange {
            min: self.cell_index(&world.min),
            max: self.cell_index(&world.max),
        }
    }

    /// Recompute every shape's bounding box and rebuild the index from
    /// scratch.
    ///
    /// Shape ids must equal their positions in `shapes`.
    pub fn rebuild(&mut self, shapes: &mut [Shape]) {
        for (index, shape) in shapes.iter_mut().enumerate() {
            debug_assert_eq!(shape.id, index, "shape ids must match their slice positions");
            shape.bbox.world = bounding_box(&shape.primitive);
            shape.bbox.cells = self.cell_range(&shape.bbox.world);
        }
        let ranges: Vec<CellRange> = shapes.iter().map(|s| s.bbox.cells).collect();
        self.populate_ranges(&ranges);
    }

    /// Rebuild the index from explicit cell ranges; entry `n` registers
    /// shape id `n` in every cell of `ranges[n]`.
    ///
    /// Counts memberships per cell, turns the counts into offsets with an
    /// exclusive prefix sum, then scatters ids using a copy of the offsets
    /// as write cursors. Cells outside the grid are skipped.
    pub fn populate_ranges(&mut self, ranges: &[CellRange]) {
        let n_cells = self.spec.cell_count();

        let mut counts = vec![0usize; n_cells];
        for range in ranges {
            for cell in range.cells().filter(|&c| self.contains_cell(c)) {
                counts[self.linear_index(cell)] += 1;
            }
        }

        let mut starts = Vec::with_capacity(n_cells + 1);
        let mut total = 0;
        starts.push(0);
        for count in &counts {
            total += count;
            starts.push(total);
        }

        let mut cursors = starts[..n_cells].to_vec();
        let mut contents = vec![0usize; total];
        for (id, range) in ranges.iter().enumerate() {
            for cell in range.cells().filter(|&c| self.contains_cell(c)) {
                let c = self.linear_index(cell);
                contents[cursors[c]] = id;
                cursors[c] += 1;
            }
        }

        self.starts = starts;
        self.contents = contents;

        let stats = self.stats();
        debug!(
            "grid rebuilt: {} shapes, {} entries in {} of {} cells (max {} per cell)",
            ranges.len(),
            stats.entries,
            stats.occupied_cells,
            n_cells,
            stats.max_per_cell
        );
    }

    /// Shape ids registered in a cell; empty for cells outside the grid.
    pub fn cell_contents(&self, cell: [usize; 3]) -> &[usize] {
        if !self.contains_cell(cell) {
            return &[];
        }
        let c = self.linear_index(cell);
        &self.contents[self.starts[c]..self.starts[c + 1]]
    }

    /// CSR offsets, one per cell plus a trailing total.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Flat shape-id array indexed by [`starts`](UniformGrid::starts).
    pub fn contents(&self) -> &[usize] {
        &self.contents
    }

    /// Occupancy summary.
    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            entries: self.contents.len(),
            ..GridStats::default()
        };
        for w in self.starts.windows(2) {
            let n = w[1] - w[0];
            if n > 0 {
                stats.occupied_cells += 1;
                stats.max_per_cell = stats.max_per_cell.max(n);
            }
        }
        stats
    }
}
