//! Ray-triangle intersection by Cramer's rule.

use gridtrace_math::triple;

use super::admissible;
use crate::{Ray, Triangle};

/// Determinants below this magnitude mean the ray lies in the triangle's plane.
const DET_EPSILON: f64 = 1e-12;

/// Intersect a ray with a triangle.
///
/// Solves `start + t·dir = λ1·v0 + λ2·v1 + (1 − λ1 − λ2)·v2` for
/// `(λ1, λ2, t)` and accepts when both barycentric weights are
/// non-negative and sum to at most one.
pub fn intersect_triangle(ray: &Ray, tri: &Triangle, t_bound: f64) -> Option<f64> {
    let [v0, v1, v2] = &tri.vertices;

    let b1 = v2 - v0;
    let b2 = v2 - v1;
    let b3 = ray.dir;
    let r = v2 - ray.start;

    let det = triple(&b2, &b3, &b1);
    if det.abs() < DET_EPSILON {
        return None;
    }

    let l1 = triple(&b2, &b3, &r) / det;
    let l2 = triple(&b3, &b1, &r) / det;
    let t = triple(&b1, &b2, &r) / det;

    if l1 < 0.0 || l2 < 0.0 || l1 + l2 > 1.0 {
        return None;
    }
    admissible(t, t_bound).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtrace_math::{Point3, Vec3};

    fn floor_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        )
    }

    #[test]
    fn test_ray_hits_triangle() {
        let ray = Ray::new(Point3::new(0.5, 3.0, 0.5), -Vec3::y());
        let t = intersect_triangle(&ray, &floor_triangle(), f64::INFINITY).unwrap();
        assert!((t - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_hit_from_either_side() {
        let ray = Ray::new(Point3::new(0.5, -3.0, 0.5), Vec3::y());
        let t = intersect_triangle(&ray, &floor_triangle(), f64::INFINITY).unwrap();
        assert!((t - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ray_outside_hypotenuse_misses() {
        let ray = Ray::new(Point3::new(1.5, 3.0, 1.5), -Vec3::y());
        assert!(intersect_triangle(&ray, &floor_triangle(), f64::INFINITY).is_none());
    }

    #[test]
    fn test_ray_in_plane_misses() {
        let ray = Ray::new(Point3::new(-1.0, 0.0, 0.5), Vec3::x());
        assert!(intersect_triangle(&ray, &floor_triangle(), f64::INFINITY).is_none());
    }

    #[test]
    fn test_hit_point_reconstructs_from_barycentrics() {
        let tri = Triangle::new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 1.0, 1.0));
        let t = intersect_triangle(&ray, &tri, f64::INFINITY).unwrap();
        let p = ray.at(t);
        assert!((p - Point3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)).norm() < 1e-12);
    }
}
