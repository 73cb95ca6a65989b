//! Axis-aligned bounding boxes in world and grid-cell coordinates.
//!
//! The world box of every primitive is a closed-form function of its
//! geometry. Planar primitives are given a small thickness along their
//! normal so a grid cell face lying exactly in their plane still sees
//! them from both sides.

use gridtrace_math::{Point3, Vec3};

use crate::primitive::{Cone, Cylinder, Disk, Primitive, Rectangle, Sphere, Triangle};

/// Half-thickness given to disks, rectangles and triangles.
pub const PLANAR_PAD: f64 = 1e-3;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Box centered on `center` with half-extent `half` along each axis.
    pub fn around(center: &Point3, half: &Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Expand this AABB to include another box.
    pub fn include_box(&mut self, other: &Aabb3) {
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Closed containment test.
    pub fn contains(&self, p: &Point3) -> bool {
        (0..3).all(|a| p[a] >= self.min[a] && p[a] <= self.max[a])
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        let pad = Vec3::repeat(tol);
        self.min -= pad;
        self.max += pad;
    }

    /// Center point.
    pub fn center(&self) -> Point3 {
        self.min + 0.5 * (self.max - self.min)
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Inclusive range of grid-cell indices `min..=max` along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Lowest cell index per axis.
    pub min: [usize; 3],
    /// Highest cell index per axis (inclusive).
    pub max: [usize; 3],
}

impl CellRange {
    /// A range covering no cells.
    pub const EMPTY: CellRange = CellRange {
        min: [1, 1, 1],
        max: [0, 0, 0],
    };

    /// Range covering a single cell.
    pub fn single(cell: [usize; 3]) -> Self {
        Self {
            min: cell,
            max: cell,
        }
    }

    /// True when the range covers no cell.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|a| self.min[a] > self.max[a])
    }

    /// Number of cells covered.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (0..3).map(|a| self.max[a] - self.min[a] + 1).product()
    }

    /// Whether `cell` lies in the range.
    pub fn contains(&self, cell: [usize; 3]) -> bool {
        (0..3).all(|a| cell[a] >= self.min[a] && cell[a] <= self.max[a])
    }

    /// Every covered cell, `i` fastest.
    pub fn cells(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (self.min[2]..=self.max[2])
            .flat_map(move |k| (self.min[1]..=self.max[1]).map(move |j| (j, k)))
            .flat_map(move |(j, k)| (self.min[0]..=self.max[0]).map(move |i| [i, j, k]))
    }
}

impl Default for CellRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Cached bounds of a shape: its world box and the grid cells it spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// World-space box.
    pub world: Aabb3,
    /// Cells of the owning grid overlapped by `world`.
    pub cells: CellRange,
}

impl BoundingBox {
    /// Bounds not yet registered in any grid.
    pub fn unregistered(world: Aabb3) -> Self {
        Self {
            world,
            cells: CellRange::EMPTY,
        }
    }
}

/// World-space bounding box of a primitive.
pub fn bounding_box(primitive: &Primitive) -> Aabb3 {
    match primitive {
        Primitive::Sphere(s) => sphere_box(s),
        Primitive::Disk(d) => disk_box(d),
        Primitive::Cylinder(c) => cylinder_box(c),
        Primitive::Cone(c) => cone_box(c),
        Primitive::Triangle(t) => triangle_box(t),
        Primitive::Rectangle(r) => rectangle_box(r),
    }
}

fn sphere_box(s: &Sphere) -> Aabb3 {
    Aabb3::around(&s.center, &Vec3::repeat(s.radius))
}

/// Half-extent per axis of a circle of radius `r` in the plane with unit
/// normal `n`: `r * sqrt(1 - n_a^2)`.
fn circle_half_extent(n: &Vec3, r: f64) -> Vec3 {
    Vec3::new(
        r * (n.y * n.y + n.z * n.z).sqrt(),
        r * (n.x * n.x + n.z * n.z).sqrt(),
        r * (n.x * n.x + n.y * n.y).sqrt(),
    )
}

fn disk_box(d: &Disk) -> Aabb3 {
    let half = circle_half_extent(&d.normal, d.radius) + PLANAR_PAD * d.normal.abs();
    Aabb3::around(&d.center, &half)
}

fn cylinder_box(c: &Cylinder) -> Aabb3 {
    let ring = circle_half_extent(&c.axis, c.radius);
    let mut bbox = Aabb3::around(&c.center, &ring);
    bbox.include_box(&Aabb3::around(&(c.center + c.height * c.axis), &ring));
    bbox
}

fn cone_box(c: &Cone) -> Aabb3 {
    let ring = circle_half_extent(&c.axis, c.radius);
    let mut bbox = Aabb3::around(&(c.vertex + c.height * c.axis), &ring);
    bbox.include_point(&c.vertex);
    bbox
}

fn triangle_box(t: &Triangle) -> Aabb3 {
    let mut bbox = Aabb3::empty();
    for v in &t.vertices {
        bbox.include_point(v);
    }
    bbox.expand(PLANAR_PAD);
    bbox
}

fn rectangle_box(r: &Rectangle) -> Aabb3 {
    let a0 = 0.5 * r.lengths[0] * r.axes[0];
    let a1 = 0.5 * r.lengths[1] * r.axes[1];
    let dn = PLANAR_PAD * r.normal();
    let mut bbox = Aabb3::empty();
    for s0 in [-1.0_f64, 1.0] {
        for s1 in [-1.0_f64, 1.0] {
            for sn in [-1.0_f64, 1.0] {
                bbox.include_point(&(r.center + s0 * a0 + s1 * a1 + sn * dn));
            }
        }
    }
    bbox
}
