#![warn(missing_docs)]

//! Math types for the gridtrace renderer.
//!
//! Thin wrappers around nalgebra providing the point, vector and
//! transform types shared by the geometry, grid and trace crates, plus
//! the handful of vector identities the solvers lean on (orthogonal
//! rejection, triple product, guarded normalisation).

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Lengths below this are treated as zero when normalising.
pub const NORM_EPSILON: f64 = 1e-12;

/// Component of `a` orthogonal to the unit vector `b`: `a - (a·b) b`.
#[inline]
pub fn reject(a: &Vec3, b: &Vec3) -> Vec3 {
    a - a.dot(b) * b
}

/// Scalar triple product `(a × b) · c`.
#[inline]
pub fn triple(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    a.cross(b).dot(c)
}

/// Normalize `v`, returning the zero vector when `v` is degenerate.
#[inline]
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    v.try_normalize(NORM_EPSILON).unwrap_or_else(Vec3::zeros)
}

/// Normalize `v`, returning `fallback` when `v` is degenerate.
#[inline]
pub fn normalize_or(v: &Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize(NORM_EPSILON).unwrap_or(fallback)
}

/// Any unit vector orthogonal to the unit vector `a`.
pub fn any_orthogonal(a: &Vec3) -> Vec3 {
    // Cross with the coordinate axis least aligned with `a`.
    let helper = if a.x.abs() <= a.y.abs() && a.x.abs() <= a.z.abs() {
        Vec3::x()
    } else if a.y.abs() <= a.z.abs() {
        Vec3::y()
    } else {
        Vec3::z()
    };
    normalize_or(&a.cross(&helper), Vec3::x())
}

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation by `angle` radians about the vertical (Y) line through `pivot`.
    ///
    /// Used to orbit the view around the scene between animation frames.
    pub fn orbit_y(angle: f64, pivot: &Point3) -> Self {
        Self::translation(pivot.x, pivot.y, pivot.z)
            .then(&Self::rotation_y(angle))
            .then(&Self::translation(-pivot.x, -pivot.y, -pivot.z))
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_reject_removes_axis_component() {
        let a = Vec3::new(3.0, 4.0, 5.0);
        let r = reject(&a, &Vec3::z());
        assert_relative_eq!(r, Vec3::new(3.0, 4.0, 0.0), epsilon = 1e-12);
        assert!(r.dot(&Vec3::z()).abs() < 1e-12);
    }

    #[test]
    fn test_triple_product_is_signed_volume() {
        assert!((triple(&Vec3::x(), &Vec3::y(), &Vec3::z()) - 1.0).abs() < 1e-12);
        assert!((triple(&Vec3::y(), &Vec3::x(), &Vec3::z()) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_degenerate() {
        assert_eq!(normalize_or_zero(&Vec3::zeros()), Vec3::zeros());
        let n = normalize_or_zero(&Vec3::new(0.0, 3.0, 4.0));
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert_eq!(normalize_or(&Vec3::zeros(), Vec3::y()), Vec3::y());
    }

    #[test]
    fn test_any_orthogonal() {
        for a in [Vec3::x(), Vec3::y(), Vec3::z(), Vec3::new(1.0, 2.0, 3.0).normalize()] {
            let o = any_orthogonal(&a);
            assert!(o.dot(&a).abs() < 1e-12);
            assert!((o.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result.x - 11.0).abs() < 1e-12);
        assert!((result.y - 22.0).abs() < 1e-12);
        assert!((result.z - 33.0).abs() < 1e-12);
        // Directions ignore translation.
        let v = t.apply_vec(&Vec3::x());
        assert_relative_eq!(v, Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_orbit_keeps_pivot_and_height() {
        let pivot = Point3::new(5.0, 2.0, 5.0);
        let t = Transform::orbit_y(PI / 2.0, &pivot);
        assert_relative_eq!(t.apply_point(&pivot), pivot, epsilon = 1e-12);

        let p = Point3::new(6.0, 7.0, 5.0);
        let q = t.apply_point(&p);
        assert!((q.y - 7.0).abs() < 1e-12);
        assert!(((q - pivot).xz().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::orbit_y(0.3, &Point3::new(1.0, 2.0, 3.0));
        let inv = t.inverse().unwrap();
        let composed = t.then(&inv);
        let p = Point3::new(5.0, 6.0, 7.0);
        let result = composed.apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }
}
