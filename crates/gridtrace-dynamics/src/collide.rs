//! Contact detection and velocity response.

use gridtrace_geom::{normal, project, Shape, Sphere};
use gridtrace_grid::UniformGrid;
use gridtrace_math::Vec3;
use rayon::prelude::*;

use crate::DynamicsSettings;

/// Added to squared centre distances before dividing.
const CONTACT_EPSILON: f64 = 1e-6;

/// New motion state computed for one sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereResponse {
    /// Shape id of the sphere.
    pub id: usize,
    /// Velocity after collisions, used to move the sphere.
    pub velocity: Vec3,
    /// Acceleration applied after the move.
    pub force: Vec3,
    /// Spheres this one collided with.
    pub sphere_contacts: usize,
    /// Non-sphere shape the sphere bounced off, if any.
    pub wall: Option<usize>,
}

/// Compute the response of every sphere from the current positions.
///
/// Each sphere looks only at the shapes registered in the cells of its
/// cached cell range, so `grid` must have been rebuilt from `shapes`.
/// Overlapping spheres that are not already separating exchange momentum
/// along the line between their centres. The non-sphere shape penetrated
/// most deeply reflects the normal component of the velocity and cancels
/// the normal component of gravity. Nothing is mutated; spheres are
/// handled in parallel and the output is in shape order.
pub fn collide(grid: &UniformGrid, shapes: &[Shape], settings: &DynamicsSettings) -> Vec<SphereResponse> {
    shapes
        .par_iter()
        .filter_map(|shape| {
            let sphere = shape.primitive.as_sphere()?;
            Some(respond(grid, shapes, shape, sphere, settings))
        })
        .collect()
}

/// Euler-forward update: move by the new velocity, then accelerate.
pub fn apply(shapes: &mut [Shape], responses: &[SphereResponse], dt: f64) {
    for response in responses {
        let Some(sphere) = shapes.get_mut(response.id).and_then(Shape::sphere_mut) else {
            continue;
        };
        sphere.center += dt * response.velocity;
        sphere.velocity = response.velocity + dt * response.force;
    }
}

fn respond(
    grid: &UniformGrid,
    shapes: &[Shape],
    shape: &Shape,
    sphere: &Sphere,
    settings: &DynamicsSettings,
) -> SphereResponse {
    let id = shape.id;
    let mut contacts: Vec<usize> = Vec::with_capacity(settings.max_sphere_contacts.min(shapes.len()));
    let mut wall: Option<(usize, f64)> = None;

    for cell in shape.bbox.cells.cells() {
        for &other_id in grid.cell_contents(cell) {
            if other_id == id {
                continue;
            }
            let Some(other) = shapes.get(other_id) else {
                continue;
            };
            match other.primitive.as_sphere() {
                Some(ball) => {
                    if contacts.len() < settings.max_sphere_contacts
                        && approaching(sphere, ball)
                        && !contacts.contains(&other_id)
                    {
                        contacts.push(other_id);
                    }
                }
                None => {
                    let (distance, _) = project(&sphere.center, &other.primitive);
                    if distance < sphere.radius && wall.map_or(true, |(_, best)| distance < best) {
                        wall = Some((other_id, distance));
                    }
                }
            }
        }
    }

    let mut velocity = sphere.velocity;
    for &other_id in &contacts {
        if let Some(ball) = shapes[other_id].primitive.as_sphere() {
            let dx = ball.center - sphere.center;
            let scale = dx.norm_squared() + CONTACT_EPSILON;
            let dv = (ball.velocity.dot(&dx) - sphere.velocity.dot(&dx)) / scale;
            velocity += settings.sphere_restitution * dv * dx;
        }
    }

    let mut force = settings.gravity;
    if let Some((wall_id, _)) = wall {
        let surface = &shapes[wall_id].primitive;
        let (_, closest) = project(&sphere.center, surface);
        let n = normal(surface, &closest);
        let disp = sphere.center - closest;
        if sphere.velocity.dot(&disp) < 0.0 {
            velocity -= settings.wall_restitution * sphere.velocity.dot(&n) * n;
        }
        force -= force.dot(&n) * n;
    }

    SphereResponse {
        id,
        velocity,
        force,
        sphere_contacts: contacts.len(),
        wall: wall.map(|(wall_id, _)| wall_id),
    }
}

/// Overlapping and not already moving apart.
fn approaching(a: &Sphere, b: &Sphere) -> bool {
    let dx = b.center - a.center;
    if dx.norm() >= a.radius + b.radius {
        return false;
    }
    let scale = dx.norm_squared() + CONTACT_EPSILON;
    let va = a.velocity.dot(&dx) / scale;
    let vb = b.velocity.dot(&dx) / scale;
    !(va < 0.0 && vb > 0.0)
}
