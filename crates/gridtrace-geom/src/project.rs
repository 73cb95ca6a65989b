//! Closest-point projection onto primitives.
//!
//! Every solver is a clamped closed form and always succeeds with a
//! finite, non-negative distance. The collision step uses these to find
//! how deep a moving sphere has sunk into a static primitive.

use gridtrace_math::{any_orthogonal, normalize_or, reject, Point3, Vec3};

use crate::{Cone, Cylinder, Disk, Primitive, Rectangle, Sphere, Triangle};

/// Closest point on `primitive` to `p`, with its distance.
pub fn project(p: &Point3, primitive: &Primitive) -> (f64, Point3) {
    let closest = match primitive {
        Primitive::Sphere(s) => project_sphere(p, s),
        Primitive::Disk(d) => project_disk(p, d),
        Primitive::Cylinder(c) => project_cylinder(p, c),
        Primitive::Cone(c) => project_cone(p, c),
        Primitive::Triangle(t) => project_triangle(p, t),
        Primitive::Rectangle(r) => project_rectangle(p, r),
    };
    ((closest - p).norm(), closest)
}

/// Unit direction of `v`, or some direction orthogonal to `axis` when `v`
/// vanishes (query point on the axis).
fn radial_dir(v: &Vec3, axis: &Vec3) -> Vec3 {
    normalize_or(v, any_orthogonal(axis))
}

fn project_sphere(p: &Point3, s: &Sphere) -> Point3 {
    let dir = normalize_or(&(p - s.center), Vec3::x());
    s.center + s.radius * dir
}

fn project_disk(p: &Point3, d: &Disk) -> Point3 {
    let in_plane = reject(&(p - d.center), &d.normal);
    let len = in_plane.norm();
    let scale = if len > d.radius { d.radius / len } else { 1.0 };
    d.center + scale * in_plane
}

fn project_cylinder(p: &Point3, c: &Cylinder) -> Point3 {
    let pc = p - c.center;
    let z = pc.dot(&c.axis).clamp(0.0, c.height);
    let radial = radial_dir(&reject(&pc, &c.axis), &c.axis);
    c.center + z * c.axis + c.radius * radial
}

/// In the meridian half-plane through `p` the cone is the segment from the
/// apex `(r, h) = (0, 0)` to the rim `(R, H)`; project onto that segment.
fn project_cone(p: &Point3, c: &Cone) -> Point3 {
    let pv = p - c.vertex;
    let h = pv.dot(&c.axis);
    let radial = reject(&pv, &c.axis);
    let r = radial.norm();
    let u = radial_dir(&radial, &c.axis);

    let (rr, hh) = (c.radius, c.height);
    let s = ((rr * r + hh * h) / (hh * hh + rr * rr)).clamp(0.0, 1.0);
    c.vertex + s * (hh * c.axis + rr * u)
}

fn project_triangle(p: &Point3, t: &Triangle) -> Point3 {
    let [v0, v1, v2] = &t.vertices;
    let e0 = v0 - v2;
    let e1 = v1 - v2;
    let pv = p - v2;

    // Least-squares barycentric coordinates of the in-plane projection.
    let a00 = e0.dot(&e0);
    let a01 = e0.dot(&e1);
    let a11 = e1.dot(&e1);
    let r0 = e0.dot(&pv);
    let r1 = e1.dot(&pv);
    let det = a00 * a11 - a01 * a01;

    if det > f64::EPSILON * a00 * a11 {
        let l0 = (a11 * r0 - a01 * r1) / det;
        let l1 = (a00 * r1 - a01 * r0) / det;
        if l0 >= 0.0 && l1 >= 0.0 && l0 + l1 <= 1.0 {
            return v2 + l0 * e0 + l1 * e1;
        }
    }

    // Outside (or degenerate): nearest point over the three edges.
    [(v0, v1), (v1, v2), (v2, v0)]
        .into_iter()
        .map(|(a, b)| project_segment(p, a, b))
        .min_by(|a, b| (a - p).norm_squared().total_cmp(&(b - p).norm_squared()))
        .unwrap_or(*v0)
}

fn project_segment(p: &Point3, a: &Point3, b: &Point3) -> Point3 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return *a;
    }
    let s = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    a + s * ab
}

fn project_rectangle(p: &Point3, r: &Rectangle) -> Point3 {
    let pc = p - r.center;
    let u = pc.dot(&r.axes[0]).clamp(-0.5 * r.lengths[0], 0.5 * r.lengths[0]);
    let v = pc.dot(&r.axes[1]).clamp(-0.5 * r.lengths[1], 0.5 * r.lengths[1]);
    r.center + u * r.axes[0] + v * r.axes[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_project_sphere() {
        let s = Primitive::Sphere(Sphere::new(Point3::new(1.0, 0.0, 0.0), 2.0));
        let (d, q) = project(&Point3::new(1.0, 5.0, 0.0), &s);
        assert!((d - 3.0).abs() < 1e-12);
        assert_relative_eq!(q, Point3::new(1.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_project_disk_radial_clamp() {
        let disk = Primitive::Disk(Disk::new(Point3::origin(), Vec3::z(), 1.0));
        let (d, q) = project(&Point3::new(0.5, 0.0, 2.0), &disk);
        assert!((d - 2.0).abs() < 1e-12);
        assert_relative_eq!(q, Point3::new(0.5, 0.0, 0.0), epsilon = 1e-12);

        let (d, q) = project(&Point3::new(4.0, 0.0, 3.0), &disk);
        assert_relative_eq!(q, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert!((d - (9.0f64 + 9.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_project_cylinder() {
        let cyl = Primitive::Cylinder(Cylinder::new(Point3::origin(), Vec3::y(), 1.0, 2.0));
        // Beside the wall.
        let (d, q) = project(&Point3::new(3.0, 1.0, 0.0), &cyl);
        assert!((d - 2.0).abs() < 1e-12);
        assert_relative_eq!(q, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        // Above the open top: nearest is on the rim.
        let (_, q) = project(&Point3::new(0.0, 5.0, 0.5), &cyl);
        assert_relative_eq!(q, Point3::new(0.0, 2.0, 1.0), epsilon = 1e-12);
        // On the axis: any rim direction at the clamped height.
        let (d, q) = project(&Point3::new(0.0, 1.0, 0.0), &cyl);
        assert!((d - 1.0).abs() < 1e-12);
        assert!((q.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_cone() {
        // Apex at origin, opening along +y to radius 1 at height 1 (45 degrees).
        let cone = Primitive::Cone(Cone::new(Point3::origin(), Vec3::y(), 1.0, 1.0));
        // Point off the wall at height 0.5 on the axis side.
        let (d, q) = project(&Point3::new(1.0, 0.0, 0.0), &cone);
        assert_relative_eq!(q, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        assert!((d - 0.5f64.sqrt()).abs() < 1e-12);
        // Below the apex, the apex is nearest.
        let (d, q) = project(&Point3::new(0.1, -2.0, 0.0), &cone);
        assert_relative_eq!(q, Point3::origin(), epsilon = 1e-12);
        assert!((d - (0.01f64 + 4.0).sqrt()).abs() < 1e-12);
        // Beyond the rim.
        let (_, q) = project(&Point3::new(3.0, 3.0, 0.0), &cone);
        assert_relative_eq!(q, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        // On the axis: still a point on the surface.
        let (d, q) = project(&Point3::new(0.0, 0.5, 0.0), &cone);
        assert!(d.is_finite());
        assert!((q.y - (q.x * q.x + q.z * q.z).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_project_triangle() {
        let tri = Primitive::Triangle(Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        ));
        // Above the interior.
        let (d, q) = project(&Point3::new(0.5, 3.0, 0.5), &tri);
        assert!((d - 3.0).abs() < 1e-12);
        assert_relative_eq!(q, Point3::new(0.5, 0.0, 0.5), epsilon = 1e-12);
        // Past the hypotenuse: clamped onto it.
        let (_, q) = project(&Point3::new(2.0, 1.0, 2.0), &tri);
        assert_relative_eq!(q, Point3::new(1.0, 0.0, 1.0), epsilon = 1e-12);
        // Past a corner.
        let (_, q) = project(&Point3::new(-1.0, 0.0, -1.0), &tri);
        assert_relative_eq!(q, Point3::origin(), epsilon = 1e-12);
    }

    #[test]
    fn test_project_rectangle() {
        let rect = Primitive::Rectangle(Rectangle::new(Point3::origin(), Vec3::x(), Vec3::z(), 2.0, 4.0));
        let (d, q) = project(&Point3::new(0.5, 1.0, 0.5), &rect);
        assert!((d - 1.0).abs() < 1e-12);
        assert_relative_eq!(q, Point3::new(0.5, 0.0, 0.5), epsilon = 1e-12);
        let (_, q) = project(&Point3::new(5.0, -1.0, 5.0), &rect);
        assert_relative_eq!(q, Point3::new(1.0, 0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_distance_is_never_nan() {
        let p = Point3::new(0.0, 0.0, 0.0);
        let prims = [
            Primitive::Sphere(Sphere::new(p, 1.0)),
            Primitive::Disk(Disk::new(p, Vec3::z(), 1.0)),
            Primitive::Cylinder(Cylinder::new(p, Vec3::z(), 1.0, 1.0)),
            Primitive::Cone(Cone::new(p, Vec3::z(), 1.0, 1.0)),
            Primitive::Triangle(Triangle::new(p, p, p)),
            Primitive::Rectangle(Rectangle::new(p, Vec3::x(), Vec3::y(), 1.0, 1.0)),
        ];
        for prim in &prims {
            let (d, q) = project(&p, prim);
            assert!(d.is_finite() && d >= 0.0, "{}", prim.kind());
            assert!(q.coords.iter().all(|c| c.is_finite()));
        }
    }
}
