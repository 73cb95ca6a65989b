//! Ray-rectangle intersection.

use super::admissible;
use super::disk::intersect_plane;
use crate::{Ray, Rectangle};

/// Intersect a ray with a rectangle.
///
/// The plane normal is the cross product of the two axes; the hit point
/// must then fall within each side length along its own axis.
pub fn intersect_rectangle(ray: &Ray, rect: &Rectangle, t_bound: f64) -> Option<f64> {
    let t = intersect_plane(ray, &rect.center, &rect.normal())?;
    if !admissible(t, t_bound) {
        return None;
    }
    let (h1, h2) = rect.local_coords(&ray.at(t));
    let inside = (0.0..=rect.lengths[0]).contains(&h1) && (0.0..=rect.lengths[1]).contains(&h2);
    inside.then_some(t)
}
