//! Ray-sphere intersection (quadratic equation).

use super::{pick_root, solve_quadratic};
use crate::{Ray, Sphere};

/// Intersect a ray with a sphere.
///
/// Solves `|start + t·dir − center|² = r²`; returns the nearest admissible
/// root below `t_bound`.
pub fn intersect_sphere(ray: &Ray, sphere: &Sphere, t_bound: f64) -> Option<f64> {
    let oc = ray.start - sphere.center;
    let d = &ray.dir;

    let a = d.dot(d);
    let half_b = oc.dot(d);
    let c = oc.dot(&oc) - sphere.radius * sphere.radius;

    let roots = solve_quadratic(a, half_b, c)?;
    pick_root(roots, t_bound, |_| true)
}

/// Both roots of the sphere quadratic, ascending, without any filtering.
#[cfg(test)]
pub(crate) fn sphere_roots(ray: &Ray, sphere: &Sphere) -> Option<[f64; 2]> {
    let oc = ray.start - sphere.center;
    solve_quadratic(ray.dir.dot(&ray.dir), oc.dot(&ray.dir), oc.dot(&oc) - sphere.radius * sphere.radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtrace_math::{Point3, Vec3};

    #[test]
    fn test_ray_sphere_through_center() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, 0.0), 5.0);
        // Ray from (-10, 0, 0) pointing +x, hitting sphere at x = ±5
        let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let roots = sphere_roots(&ray, &sphere).unwrap();
        assert!((roots[0] - 5.0).abs() < 1e-10);
        assert!((roots[1] - 15.0).abs() < 1e-10);

        let t = intersect_sphere(&ray, &sphere, f64::INFINITY).unwrap();
        assert!((t - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_roots_are_distance_minus_and_plus_radius() {
        let center = Point3::new(3.0, -1.0, 2.0);
        let radius = 0.75;
        let sphere = Sphere::new(center, radius);
        for dir in [Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.5, 0.0), Vec3::z()] {
            let d = 7.5;
            let start = center - d * dir.normalize();
            let ray = Ray::new(start, dir);
            let roots = sphere_roots(&ray, &sphere).unwrap();
            assert!((roots[0] - (d - radius)).abs() < 1e-10);
            assert!((roots[1] - (d + radius)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_ray_sphere_miss() {
        let sphere = Sphere::new(Point3::origin(), 5.0);
        let ray = Ray::new(Point3::new(-10.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(intersect_sphere(&ray, &sphere, f64::INFINITY).is_none());
    }

    #[test]
    fn test_ray_sphere_from_inside() {
        let sphere = Sphere::new(Point3::origin(), 5.0);
        // Entry root is behind the origin; the exit root is taken.
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.0, 0.0));
        let t = intersect_sphere(&ray, &sphere, f64::INFINITY).unwrap();
        assert!((t - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_leaving_surface_ignores_self_hit() {
        let sphere = Sphere::new(Point3::origin(), 1.0);
        // Start on the surface heading outward: only the root at t = 0 exists.
        let ray = Ray::new(Point3::new(1.0, 0.0, 0.0), Vec3::x());
        assert!(intersect_sphere(&ray, &sphere, f64::INFINITY).is_none());
    }

    #[test]
    fn test_end_to_end_unit_sphere() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray::new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0));
        let t = intersect_sphere(&ray, &sphere, f64::INFINITY).unwrap();
        assert!((t - 4.0).abs() < 1e-12);
        let p = ray.at(t);
        assert!((p - Point3::new(0.0, 0.0, 4.0)).norm() < 1e-12);
    }
}
