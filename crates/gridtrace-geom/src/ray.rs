//! Ray representation.

use gridtrace_math::{normalize_or_zero, Point3, Vec3};

/// A ray in 3D space: `start + t * dir` for `t > 0`.
///
/// Besides geometry a ray carries its generation in the light-transport
/// tree (`level`, 0 for the primary ray) and the weight its contribution
/// is scaled by (`coef`, 1.0 for the primary ray, non-increasing along a
/// reflection path).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub start: Point3,
    /// Unit direction of the ray.
    pub dir: Vec3,
    /// Recursion depth that spawned this ray.
    pub level: u32,
    /// Accumulated contribution weight.
    pub coef: f64,
}

impl Ray {
    /// Create a primary ray. The direction is normalized.
    pub fn new(start: Point3, dir: Vec3) -> Self {
        Self::spawn(start, dir, 0, 1.0)
    }

    /// Create a ray at a given depth and weight. The direction is normalized.
    pub fn spawn(start: Point3, dir: Vec3, level: u32, coef: f64) -> Self {
        Self {
            start,
            dir: normalize_or_zero(&dir),
            level,
            coef,
        }
    }

    /// Evaluate the ray at parameter `t`: `start + t * dir`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.start + t * self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Point3::origin(), Vec3::new(0.0, 3.0, 4.0));
        assert!((ray.dir.norm() - 1.0).abs() < 1e-12);
        assert_eq!(ray.level, 0);
        assert_eq!(ray.coef, 1.0);
    }

    #[test]
    fn test_spawn_keeps_level_and_weight() {
        let ray = Ray::spawn(Point3::origin(), Vec3::x() * 7.0, 3, 0.25);
        assert_eq!(ray.level, 3);
        assert_eq!(ray.coef, 0.25);
        assert_eq!(ray.dir, Vec3::x());
    }
}
