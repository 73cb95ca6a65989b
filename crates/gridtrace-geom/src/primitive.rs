//! Primitive value types and the scene-level [`Shape`] wrapper.

use gridtrace_math::{normalize_or_zero, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::aabb::{bounding_box, BoundingBox};

/// A sphere. The only primitive the dynamics step moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center position.
    pub center: Point3,
    /// Radius (> 0).
    pub radius: f64,
    /// Linear velocity, updated by the dynamics collaborator.
    #[serde(default = "Vec3::zeros")]
    pub velocity: Vec3,
}

impl Sphere {
    /// Create a resting sphere.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self {
            center,
            radius,
            velocity: Vec3::zeros(),
        }
    }
}

/// A flat disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    /// Disk center.
    pub center: Point3,
    /// Unit plane normal.
    pub normal: Vec3,
    /// Radius (> 0).
    pub radius: f64,
}

impl Disk {
    /// Create a disk. The normal is normalized.
    pub fn new(center: Point3, normal: Vec3, radius: f64) -> Self {
        Self {
            center,
            normal: normalize_or_zero(&normal),
            radius,
        }
    }
}

/// An open, finite cylinder: the lateral surface only, no end caps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    /// Center of the base circle.
    pub center: Point3,
    /// Unit axis from the base toward the top.
    pub axis: Vec3,
    /// Radius (> 0).
    pub radius: f64,
    /// Extent along the axis (> 0).
    pub height: f64,
}

impl Cylinder {
    /// Create a cylinder. The axis is normalized.
    pub fn new(center: Point3, axis: Vec3, radius: f64, height: f64) -> Self {
        Self {
            center,
            axis: normalize_or_zero(&axis),
            radius,
            height,
        }
    }

    /// The two disks that would close this tube, base first.
    ///
    /// Caps are separate primitives; the cylinder itself stays open.
    pub fn caps(&self) -> [Disk; 2] {
        [
            Disk::new(self.center, -self.axis, self.radius),
            Disk::new(self.center + self.height * self.axis, self.axis, self.radius),
        ]
    }
}

/// An open, finite cone: the lateral surface between apex and base rim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    /// Apex.
    pub vertex: Point3,
    /// Unit axis from the apex into the cone.
    pub axis: Vec3,
    /// Base radius (> 0).
    pub radius: f64,
    /// Distance from apex to base plane (> 0).
    pub height: f64,
}

impl Cone {
    /// Create a cone. The axis is normalized.
    pub fn new(vertex: Point3, axis: Vec3, radius: f64, height: f64) -> Self {
        Self {
            vertex,
            axis: normalize_or_zero(&axis),
            radius,
            height,
        }
    }
}

/// A triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Corner positions.
    pub vertices: [Point3; 3],
}

impl Triangle {
    /// Create a triangle from its corners.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }
}

/// Checkerboard tiling of a rectangle between two materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checker {
    /// Material used on the odd tiles.
    pub alternate: usize,
    /// Tiles along each rectangle axis.
    pub divisions: u32,
}

/// A rectangle spanned by two orthogonal unit axes about its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Center point.
    pub center: Point3,
    /// Orthogonal unit axes; the plane normal is `axes[0] × axes[1]`.
    pub axes: [Vec3; 2],
    /// Full side lengths along each axis.
    pub lengths: [f64; 2],
    /// Optional checkerboard material pattern.
    #[serde(default)]
    pub checker: Option<Checker>,
}

impl Rectangle {
    /// Create a plain rectangle. Both axes are normalized.
    pub fn new(center: Point3, axis0: Vec3, axis1: Vec3, length0: f64, length1: f64) -> Self {
        Self {
            center,
            axes: [normalize_or_zero(&axis0), normalize_or_zero(&axis1)],
            lengths: [length0, length1],
            checker: None,
        }
    }

    /// Builder-style checkerboard pattern.
    pub fn with_checker(mut self, alternate: usize, divisions: u32) -> Self {
        self.checker = Some(Checker {
            alternate,
            divisions,
        });
        self
    }

    /// Unit plane normal.
    pub fn normal(&self) -> Vec3 {
        normalize_or_zero(&self.axes[0].cross(&self.axes[1]))
    }

    /// Offsets of `p - center` along each axis, shifted so the rectangle
    /// spans `[0, length]` on both.
    pub fn local_coords(&self, p: &Point3) -> (f64, f64) {
        let x = p - self.center;
        (
            self.axes[0].dot(&x) + 0.5 * self.lengths[0],
            self.axes[1].dot(&x) + 0.5 * self.lengths[1],
        )
    }
}

/// One geometric object of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    /// Sphere.
    Sphere(Sphere),
    /// Disk.
    Disk(Disk),
    /// Open cylinder.
    Cylinder(Cylinder),
    /// Open cone.
    Cone(Cone),
    /// Triangle.
    Triangle(Triangle),
    /// Rectangle.
    Rectangle(Rectangle),
}

impl Primitive {
    /// Short lowercase name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Sphere(_) => "sphere",
            Primitive::Disk(_) => "disk",
            Primitive::Cylinder(_) => "cylinder",
            Primitive::Cone(_) => "cone",
            Primitive::Triangle(_) => "triangle",
            Primitive::Rectangle(_) => "rectangle",
        }
    }

    /// The sphere, if this is one.
    pub fn as_sphere(&self) -> Option<&Sphere> {
        match self {
            Primitive::Sphere(s) => Some(s),
            _ => None,
        }
    }
}

/// A primitive placed in a scene.
///
/// `id` is the shape's index in the scene's shape list; the grid stores
/// these ids. `bbox` must be refreshed whenever the geometry changes,
/// which the grid rebuild does for every shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    /// Stable index of this shape in its scene.
    pub id: usize,
    /// Index into the scene's material table.
    pub material: usize,
    /// Geometry.
    pub primitive: Primitive,
    /// Cached bounds in world and cell coordinates.
    pub bbox: BoundingBox,
}

impl Shape {
    /// Wrap a primitive. The world box is computed now; the cell range
    /// stays empty until a grid registers the shape.
    pub fn new(id: usize, material: usize, primitive: Primitive) -> Self {
        Self {
            id,
            material,
            primitive,
            bbox: BoundingBox::unregistered(bounding_box(&primitive)),
        }
    }

    /// Mutable access to the sphere, if this shape is one.
    pub fn sphere_mut(&mut self) -> Option<&mut Sphere> {
        match &mut self.primitive {
            Primitive::Sphere(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_normalize_axes() {
        let d = Disk::new(Point3::origin(), Vec3::new(0.0, 0.0, 2.0), 1.0);
        assert!((d.normal.norm() - 1.0).abs() < 1e-12);

        let c = Cone::new(Point3::origin(), Vec3::new(3.0, 4.0, 0.0), 1.0, 2.0);
        assert!((c.axis - Vec3::new(0.6, 0.8, 0.0)).norm() < 1e-12);

        let r = Rectangle::new(Point3::origin(), Vec3::x() * 2.0, Vec3::z() * 5.0, 1.0, 1.0);
        assert!((r.normal() - Vec3::new(0.0, -1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_cylinder_caps() {
        let cyl = Cylinder::new(Point3::new(1.0, 0.0, 0.0), Vec3::y(), 2.0, 3.0);
        let [base, top] = cyl.caps();
        assert_eq!(base.center, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(base.normal, -Vec3::y());
        assert_eq!(top.center, Point3::new(1.0, 3.0, 0.0));
        assert_eq!(top.radius, 2.0);
    }

    #[test]
    fn test_rectangle_local_coords() {
        let r = Rectangle::new(Point3::new(1.0, 1.0, 1.0), Vec3::x(), Vec3::z(), 4.0, 2.0);
        let (h1, h2) = r.local_coords(&Point3::new(1.0, 1.0, 1.0));
        assert!((h1 - 2.0).abs() < 1e-12);
        assert!((h2 - 1.0).abs() < 1e-12);
    }
}
