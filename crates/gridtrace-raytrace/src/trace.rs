//! Bounded, non-recursive tracing of one primary ray.
//!
//! Rays wait in a fixed-size FIFO queue. Each dequeued ray is resolved
//! against the grid; its hit adds direct light and may queue a reflected
//! and a refracted child. Nothing here allocates.

use gridtrace_geom::{normal, resolve_material, Color, Ray};
use gridtrace_grid::{GridHit, UniformGrid};
use gridtrace_math::{Point3, Vec3};

use crate::{Scene, TraceSettings, MAX_RAYS};

/// Counters describing one traced ray tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceStats {
    /// Rays dequeued and resolved against the grid.
    pub traced: usize,
    /// Rays that entered the queue, the primary included.
    pub enqueued: usize,
    /// Rays lost to the queue bound: children refused for lack of room
    /// plus queued rays left unprocessed.
    pub dropped: usize,
}

/// Fixed-capacity FIFO of pending rays.
struct RayQueue {
    rays: [Ray; MAX_RAYS],
    len: usize,
    next: usize,
    refused: usize,
}

impl RayQueue {
    fn new(primary: Ray) -> Self {
        Self {
            rays: [primary; MAX_RAYS],
            len: 1,
            next: 0,
            refused: 0,
        }
    }

    /// Queue a ray if there is room.
    fn push(&mut self, ray: Ray) -> bool {
        if self.len >= MAX_RAYS {
            self.refused += 1;
            return false;
        }
        self.rays[self.len] = ray;
        self.len += 1;
        true
    }

    /// Next ray in FIFO order. Processing stops once the queue has been
    /// filled to capacity.
    fn pop(&mut self) -> Option<Ray> {
        if self.next < self.len && self.len < MAX_RAYS {
            let ray = self.rays[self.next];
            self.next += 1;
            Some(ray)
        } else {
            None
        }
    }

    fn stats(&self, traced: usize) -> TraceStats {
        TraceStats {
            traced,
            enqueued: self.len,
            dropped: self.refused + (self.len - self.next),
        }
    }
}

/// Color seen along `ray`.
///
/// The ray is traced as the primary ray of a new tree: level 0 and
/// `coef` 1, whatever the incoming ray carries. A primary miss yields the background color; misses of
/// secondary rays contribute nothing.
pub fn trace(scene: &Scene, grid: &UniformGrid, ray: &Ray, settings: &TraceSettings) -> Color {
    trace_with_stats(scene, grid, ray, settings).0
}

/// [`trace`], also reporting how many rays were traced and dropped.
pub fn trace_with_stats(
    scene: &Scene,
    grid: &UniformGrid,
    ray: &Ray,
    settings: &TraceSettings,
) -> (Color, TraceStats) {
    let primary = Ray::spawn(ray.start, ray.dir, 0, 1.0);
    let mut queue = RayQueue::new(primary);
    let mut color = Color::BLACK;
    let mut traced = 0;

    while let Some(current) = queue.pop() {
        traced += 1;
        match grid.query(&current, scene.shapes(), f64::INFINITY) {
            Some(hit) => color += shade(scene, grid, &current, hit, settings, &mut queue),
            None if traced == 1 => color = settings.background,
            None => {}
        }
    }

    (color, queue.stats(traced))
}

/// Local contribution of one hit; children go onto `queue`.
fn shade(
    scene: &Scene,
    grid: &UniformGrid,
    ray: &Ray,
    hit: GridHit,
    settings: &TraceSettings,
    queue: &mut RayQueue,
) -> Color {
    let Some(shape) = scene.shapes().get(hit.shape) else {
        return Color::BLACK;
    };
    let p = ray.at(hit.t);
    let Some(material) = scene.materials().get(resolve_material(shape, &p)) else {
        return Color::BLACK;
    };

    let n = normal(&shape.primitive, &p);
    let d_dot_n = ray.dir.dot(&n);
    // A ray travelling along the normal is leaving the surface it hit.
    let exiting = d_dot_n > 0.0;
    let facing = if exiting { -n } else { n };
    let cos_in = -ray.dir.dot(&facing);

    if material.emitter {
        return material.diffuse * (cos_in * ray.coef);
    }

    let mut color = Color::BLACK;
    let spawn = ray.level + 1 < settings.effective_max_level();

    if material.reflector {
        let origin = p + settings.surface_offset * facing;
        for light in scene.lights() {
            if let Some(cos_light) = unshadowed(scene, grid, &origin, &facing, &light.position) {
                color += light.intensity * material.diffuse * (cos_light * ray.coef);
            }
        }
        if spawn {
            let dir = ray.dir - 2.0 * d_dot_n * n;
            queue.push(Ray::spawn(origin, dir, ray.level + 1, ray.coef * material.reflection));
        }
    }

    if material.refractor && spawn {
        let origin = p - settings.surface_offset * facing;
        let eta = if exiting { material.eta } else { 1.0 / material.eta };
        if let Some(dir) = refract(&ray.dir, &facing, eta) {
            queue.push(Ray::spawn(origin, dir, ray.level + 1, ray.coef));
        }
    }

    color
}

/// Cosine between `facing` and the direction to `light` when the light is
/// on the facing side and nothing lies between it and `origin`.
fn unshadowed(scene: &Scene, grid: &UniformGrid, origin: &Point3, facing: &Vec3, light: &Point3) -> Option<f64> {
    let to_light = light - origin;
    if facing.dot(&to_light) <= 0.0 {
        return None;
    }
    let distance = to_light.norm();
    let dir = to_light / distance;
    let shadow = Ray::spawn(*origin, dir, 0, 1.0);
    if grid.query(&shadow, scene.shapes(), distance).is_some() {
        return None;
    }
    Some(dir.dot(facing))
}

/// Snell's law with `facing` on the incoming side and `eta = n_in / n_out`.
/// `None` on total internal reflection.
fn refract(dir: &Vec3, facing: &Vec3, eta: f64) -> Option<Vec3> {
    let cos_i = -dir.dot(facing);
    let kappa = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if kappa < 0.0 || kappa.is_nan() {
        return None;
    }
    Some(eta * dir + (eta * cos_i - kappa.sqrt()) * facing)
}
