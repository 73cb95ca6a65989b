//! Ray-cone intersection (quadratic with radius growing along the axis).

use gridtrace_math::reject;

use super::{pick_root, solve_quadratic};
use crate::{Cone, Ray};

/// Intersect a ray with an open, finite cone.
///
/// The lateral surface satisfies `|reject(p − vertex)| = (R/H)·h` where `h`
/// is the height of `p` above the vertex along the axis. Roots whose `h`
/// falls outside `(0, height)` are discarded, which also removes the
/// mirrored nappe behind the vertex.
pub fn intersect_cone(ray: &Ray, cone: &Cone, t_bound: f64) -> Option<f64> {
    let axis = &cone.axis;
    let ratio = cone.radius / cone.height;
    let ratio2 = ratio * ratio;

    let oc = ray.start - cone.vertex;
    let pa = oc.dot(axis);
    let da = ray.dir.dot(axis);
    let h_o = reject(&oc, axis);
    let h_d = reject(&ray.dir, axis);

    let a = h_d.dot(&h_d) - ratio2 * da * da;
    let half_b = h_o.dot(&h_d) - ratio2 * da * pa;
    let c = h_o.dot(&h_o) - ratio2 * pa * pa;

    let roots = solve_quadratic(a, half_b, c)?;
    pick_root(roots, t_bound, |t| {
        let h = pa + t * da;
        h > 0.0 && h < cone.height
    })
}
