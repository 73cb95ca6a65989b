//! Ray traversal through the grid.

use gridtrace_geom::{intersect, Aabb3, Ray, Shape};
use gridtrace_math::Point3;

use crate::UniformGrid;

/// Relative slack when testing whether a hit point lies in a cell, and
/// when deciding that several exit faces are crossed at once.
const CELL_TOLERANCE: f64 = 1e-9;

/// Nearest accepted intersection found by [`UniformGrid::query`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHit {
    /// Id of the shape hit.
    pub shape: usize,
    /// Ray parameter of the hit.
    pub t: f64,
}

impl UniformGrid {
    /// Walk the grid along `ray` and return the first hit that lies inside
    /// the cell being visited, with `t < t_bound`.
    ///
    /// A ray starting outside the grid is first clipped onto its surface;
    /// if it points away from the box on any violated axis it is a miss.
    /// Cells are then visited front to back. Within a cell every
    /// registered shape is intersected against the original ray and the
    /// nearest hit whose point falls inside that cell ends the walk.
    /// Hits lying in other cells are ignored until the walk reaches them.
    pub fn query(&self, ray: &Ray, shapes: &[Shape], t_bound: f64) -> Option<GridHit> {
        let (start, t_entry) = self.clip_to_bounds(ray)?;
        let dir = ray.dir;
        let [ni, nj, nk] = self.dims();
        let mut cell = self.cell_index(&start);

        loop {
            if let Some(hit) = self.nearest_in_cell(ray, shapes, cell, t_bound) {
                return Some(hit);
            }

            // Exit parameters, measured from the clipped start, of the
            // faces the ray is heading toward.
            let bounds = self.cell_bounds(cell);
            let mut t_face = [f64::INFINITY; 3];
            for (axis, t) in t_face.iter_mut().enumerate() {
                if dir[axis] > 0.0 {
                    *t = (bounds.max[axis] - start[axis]) / dir[axis];
                } else if dir[axis] < 0.0 {
                    *t = (bounds.min[axis] - start[axis]) / dir[axis];
                }
            }
            let t_exit = t_face.iter().copied().fold(f64::INFINITY, f64::min);
            if !t_exit.is_finite() {
                return None;
            }
            // Every later cell lies beyond the bound.
            if t_entry + t_exit >= t_bound {
                return None;
            }

            let slack = CELL_TOLERANCE * (1.0 + t_exit.abs());
            for (axis, &t) in t_face.iter().enumerate() {
                if t <= t_exit + slack {
                    if dir[axis] > 0.0 {
                        cell[axis] += 1;
                    } else if cell[axis] == 0 {
                        return None;
                    } else {
                        cell[axis] -= 1;
                    }
                }
            }
            if cell[0] >= ni || cell[1] >= nj || cell[2] >= nk {
                return None;
            }
        }
    }

    /// Nearest hit among the shapes of `cell` whose point lies in the cell.
    fn nearest_in_cell(&self, ray: &Ray, shapes: &[Shape], cell: [usize; 3], t_bound: f64) -> Option<GridHit> {
        let bounds = self.cell_bounds(cell);
        let mut best: Option<GridHit> = None;
        for &id in self.cell_contents(cell) {
            let Some(shape) = shapes.get(id) else {
                continue;
            };
            let mut t = best.map_or(t_bound, |b| b.t);
            if intersect(ray, &shape.primitive, &mut t) && self.point_in_cell(&bounds, &ray.at(t)) {
                best = Some(GridHit { shape: id, t });
            }
        }
        best
    }

    /// Half-open `(min, max]` containment, widened by a small tolerance so
    /// points on a shared face are not lost between neighbours.
    fn point_in_cell(&self, bounds: &Aabb3, p: &Point3) -> bool {
        let size = self.cell_size();
        (0..3).all(|axis| {
            let eps = CELL_TOLERANCE * size[axis];
            p[axis] > bounds.min[axis] - eps && p[axis] <= bounds.max[axis] + eps
        })
    }

    /// Move the ray start onto the grid surface if it lies outside.
    /// Returns the clipped start and its parameter along the ray.
    fn clip_to_bounds(&self, ray: &Ray) -> Option<(Point3, f64)> {
        let (lo, hi) = (self.spec().min, self.spec().max);
        let d = ray.dir;
        let mut s = ray.start;
        let mut t = 0.0;
        for axis in 0..3 {
            let plane = if s[axis] < lo[axis] {
                if d[axis] <= 0.0 {
                    return None;
                }
                lo[axis]
            } else if s[axis] > hi[axis] {
                if d[axis] >= 0.0 {
                    return None;
                }
                hi[axis]
            } else {
                continue;
            };
            let t0 = (plane - s[axis]) / d[axis];
            s += t0 * d;
            s[axis] = plane;
            t += t0;
        }
        Some((s, t))
    }
}
