//! Ray-cylinder intersection (quadratic in the radial distance).

use gridtrace_math::reject;

use super::{pick_root, solve_quadratic};
use crate::{Cylinder, Ray};

/// Intersect a ray with an open, finite cylinder.
///
/// The ray is projected onto the plane orthogonal to the axis, giving a
/// quadratic in the radial distance. A root is kept only if its height
/// along the axis lies strictly inside `(0, height)`: the tube has no caps.
pub fn intersect_cylinder(ray: &Ray, cyl: &Cylinder, t_bound: f64) -> Option<f64> {
    let axis = &cyl.axis;
    let oc = ray.start - cyl.center;

    let d_perp = reject(&ray.dir, axis);
    let oc_perp = reject(&oc, axis);

    let a = d_perp.dot(&d_perp);
    // Ray is parallel to the axis
    if a < 1e-12 {
        return None;
    }
    let half_b = oc_perp.dot(&d_perp);
    let c = oc_perp.dot(&oc_perp) - cyl.radius * cyl.radius;

    let roots = solve_quadratic(a, half_b, c)?;
    let (h0, dh) = (oc.dot(axis), ray.dir.dot(axis));
    pick_root(roots, t_bound, |t| {
        let h = h0 + t * dh;
        h > 0.0 && h < cyl.height
    })
}
