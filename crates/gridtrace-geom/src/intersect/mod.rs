//! Ray-primitive intersection algorithms.
//!
//! Each primitive has a closed-form intersector returning the nearest
//! admissible ray parameter below a caller-supplied bound. All of them
//! share one root policy: a root is admissible when it lies strictly
//! between [`T_EPSILON`] and the bound (and passes any per-primitive
//! extent test); of the two roots of a quadratic the smaller admissible
//! one wins, otherwise the larger.
//!
//! A miss is an ordinary outcome, never an error, and nothing here
//! allocates.

mod cone;
mod cylinder;
mod disk;
mod rectangle;
mod sphere;
mod triangle;

pub use cone::intersect_cone;
pub use cylinder::intersect_cylinder;
pub use disk::intersect_disk;
pub use rectangle::intersect_rectangle;
pub use sphere::intersect_sphere;
pub use triangle::intersect_triangle;

use crate::{Primitive, Ray};

/// Roots at or below this parameter are self-intersections just off a
/// surface and are discarded.
pub const T_EPSILON: f64 = 1e-6;

/// Denominators below this magnitude mean the ray runs parallel to a plane.
pub const PARALLEL_EPSILON: f64 = 1e-8;

/// Intersect `ray` with `primitive`.
///
/// On a hit strictly nearer than `*t_bound`, writes the new parameter into
/// `t_bound` and returns `true`. On a miss `t_bound` is left untouched.
pub fn intersect(ray: &Ray, primitive: &Primitive, t_bound: &mut f64) -> bool {
    let hit = match primitive {
        Primitive::Sphere(s) => intersect_sphere(ray, s, *t_bound),
        Primitive::Disk(d) => intersect_disk(ray, d, *t_bound),
        Primitive::Cylinder(c) => intersect_cylinder(ray, c, *t_bound),
        Primitive::Cone(c) => intersect_cone(ray, c, *t_bound),
        Primitive::Triangle(t) => intersect_triangle(ray, t, *t_bound),
        Primitive::Rectangle(r) => intersect_rectangle(ray, r, *t_bound),
    };
    match hit {
        Some(t) => {
            *t_bound = t;
            true
        }
        None => false,
    }
}

/// Whether `t` lies in the open interval `(T_EPSILON, t_bound)`.
#[inline]
pub(crate) fn admissible(t: f64, t_bound: f64) -> bool {
    t > T_EPSILON && t < t_bound
}

/// Real roots of `a t² + 2 half_b t + c = 0`, ascending.
///
/// Uses the cancellation-free form of the quadratic formula. A vanishing
/// leading coefficient degrades to the linear equation, returned as a
/// double root.
pub(crate) fn solve_quadratic(a: f64, half_b: f64, c: f64) -> Option<[f64; 2]> {
    if a.abs() < 1e-12 {
        if half_b.abs() < 1e-12 {
            return None;
        }
        let t = -c / (2.0 * half_b);
        return Some([t, t]);
    }

    let disc = half_b * half_b - a * c;
    if disc < 0.0 {
        return None;
    }

    let q = -(half_b + half_b.signum() * disc.sqrt());
    if q == 0.0 {
        // half_b == 0 and c == 0: double root at zero
        return Some([0.0, 0.0]);
    }
    let t0 = q / a;
    let t1 = c / q;
    Some(if t0 <= t1 { [t0, t1] } else { [t1, t0] })
}

/// Apply the shared root policy: the smaller admissible root, falling back
/// to the larger. `accept` adds a per-primitive extent test.
#[inline]
pub(crate) fn pick_root(roots: [f64; 2], t_bound: f64, accept: impl Fn(f64) -> bool) -> Option<f64> {
    roots
        .into_iter()
        .find(|&t| admissible(t, t_bound) && accept(t))
}
