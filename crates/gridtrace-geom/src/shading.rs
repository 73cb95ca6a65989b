//! Surface normals and material lookup at a hit point.

use gridtrace_math::{any_orthogonal, normalize_or, reject, Point3, Vec3};

use crate::{Primitive, Rectangle, Shape};

/// Unit outward normal of `primitive` at the surface point `p`.
///
/// Planar primitives have a fixed orientation (callers flip it toward the
/// incoming ray as needed). Degenerate configurations fall back to some
/// unit vector rather than producing NaN.
pub fn normal(primitive: &Primitive, p: &Point3) -> Vec3 {
    match primitive {
        Primitive::Sphere(s) => normalize_or(&((p - s.center) / s.radius), Vec3::y()),
        Primitive::Disk(d) => d.normal,
        Primitive::Cylinder(c) => {
            let radial = reject(&(p - c.center), &c.axis);
            normalize_or(&radial, any_orthogonal(&c.axis))
        }
        Primitive::Cone(c) => {
            let radial = reject(&(p - c.vertex), &c.axis);
            let u = normalize_or(&radial, any_orthogonal(&c.axis));
            normalize_or(&(c.height * u - c.radius * c.axis), u)
        }
        Primitive::Triangle(t) => {
            let [v0, v1, v2] = &t.vertices;
            normalize_or(&(v2 - v0).cross(&(v1 - v0)), Vec3::y())
        }
        Primitive::Rectangle(r) => r.normal(),
    }
}

/// Index of the material in effect at surface point `p` of `shape`.
///
/// This is the shape's own material except on checkered rectangles, where
/// odd tiles use the alternate material.
pub fn resolve_material(shape: &Shape, p: &Point3) -> usize {
    match &shape.primitive {
        Primitive::Rectangle(r) => match checker_tile(r, p) {
            Some((alternate, true)) => alternate,
            _ => shape.material,
        },
        _ => shape.material,
    }
}

/// Alternate material and whether `p` lies on an alternate tile.
fn checker_tile(r: &Rectangle, p: &Point3) -> Option<(usize, bool)> {
    let checker = r.checker?;
    let n = f64::from(checker.divisions.max(1));
    let (h1, h2) = r.local_coords(p);
    let tile = |h: f64, len: f64| (n * h / len).floor() as i64;
    let i = tile(h1, r.lengths[0]);
    let j = tile(h2, r.lengths[1]);
    let odd = (i.rem_euclid(2) ^ (j + 1).rem_euclid(2)) == 1;
    Some((checker.alternate, odd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cone, Cylinder, Disk, Sphere, Triangle};
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_normal() {
        let s = Primitive::Sphere(Sphere::new(Point3::new(0.0, 0.0, 5.0), 1.0));
        let n = normal(&s, &Point3::new(0.0, 0.0, 4.0));
        assert_relative_eq!(n, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_cylinder_normal_is_radial() {
        let c = Primitive::Cylinder(Cylinder::new(Point3::origin(), Vec3::y(), 1.0, 2.0));
        let n = normal(&c, &Point3::new(0.0, 1.3, 1.0));
        assert_relative_eq!(n, Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_cone_normal_points_outward() {
        let c = Primitive::Cone(Cone::new(Point3::origin(), Vec3::y(), 1.0, 1.0));
        let n = normal(&c, &Point3::new(0.5, 0.5, 0.0));
        assert_relative_eq!(n, Vec3::new(1.0, -1.0, 0.0).normalize(), epsilon = 1e-12);
        // At the apex the normal is still a unit vector.
        let n = normal(&c, &Point3::origin());
        assert!((n.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_planar_normals() {
        let d = Primitive::Disk(Disk::new(Point3::origin(), Vec3::new(0.0, 2.0, 0.0), 1.0));
        assert_relative_eq!(normal(&d, &Point3::origin()), Vec3::y(), epsilon = 1e-12);

        let t = Primitive::Triangle(Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ));
        assert_relative_eq!(normal(&t, &Point3::origin()), -Vec3::z(), epsilon = 1e-12);

        let degenerate = Primitive::Triangle(Triangle::new(Point3::origin(), Point3::origin(), Point3::origin()));
        assert!(normal(&degenerate, &Point3::origin()).iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_checker_alternates_tiles() {
        let rect = Rectangle::new(Point3::origin(), Vec3::x(), Vec3::z(), 8.0, 8.0).with_checker(7, 8);
        let shape = Shape::new(0, 3, Primitive::Rectangle(rect));
        // Tile (0, 0): parity 0 xor 1 -> alternate.
        let first = resolve_material(&shape, &Point3::new(-3.5, 0.0, -3.5));
        // Tile (1, 0): parity 1 xor 1 -> own material.
        let second = resolve_material(&shape, &Point3::new(-2.5, 0.0, -3.5));
        // Tile (1, 1): parity 1 xor 0 -> alternate.
        let diagonal = resolve_material(&shape, &Point3::new(-2.5, 0.0, -2.5));
        assert_eq!(first, 7);
        assert_eq!(second, 3);
        assert_eq!(diagonal, 7);
    }

    #[test]
    fn test_plain_shape_uses_own_material() {
        let shape = Shape::new(0, 2, Primitive::Sphere(Sphere::new(Point3::origin(), 1.0)));
        assert_eq!(resolve_material(&shape, &Point3::new(1.0, 0.0, 0.0)), 2);
    }
}
