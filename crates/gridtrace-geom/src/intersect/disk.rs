//! Ray-disk intersection (plane intersection plus radius test).

use gridtrace_math::{Point3, Vec3};

use super::{admissible, PARALLEL_EPSILON};
use crate::{Disk, Ray};

/// Intersect a ray with a flat disk.
pub fn intersect_disk(ray: &Ray, disk: &Disk, t_bound: f64) -> Option<f64> {
    let t = intersect_plane(ray, &disk.center, &disk.normal)?;
    if !admissible(t, t_bound) {
        return None;
    }
    let offset = ray.at(t) - disk.center;
    (offset.norm_squared() <= disk.radius * disk.radius).then_some(t)
}

/// Parameter where the ray meets the plane through `origin` with `normal`,
/// or `None` when the ray is parallel to the plane.
pub(crate) fn intersect_plane(ray: &Ray, origin: &Point3, normal: &Vec3) -> Option<f64> {
    let denom = ray.dir.dot(normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    Some((origin - ray.start).dot(normal) / denom)
}
