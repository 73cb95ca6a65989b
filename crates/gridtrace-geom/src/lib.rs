#![warn(missing_docs)]

//! Geometry for the gridtrace renderer.
//!
//! This crate holds everything that is a pure function of one primitive:
//! the primitive value types, closed-form ray intersection, closest-point
//! projection, world-space bounding boxes, and the normal/material
//! resolution used by shading.
//!
//! # Architecture
//!
//! - [`Primitive`] / [`Shape`] - tagged union of sphere, disk, cylinder,
//!   cone, triangle and rectangle, plus scene bookkeeping
//! - [`Ray`] - ray with recursion level and contribution weight
//! - [`intersect`] - nearest-hit solvers with a caller-supplied bound
//! - [`project`] - nearest surface point to an arbitrary point
//! - [`aabb`] - bounding boxes in world and grid-cell coordinates
//! - [`shading`] - outward normals and material lookup
//!
//! # Example
//!
//! ```ignore
//! use gridtrace_geom::{intersect, Primitive, Ray, Sphere};
//! use gridtrace_math::{Point3, Vec3};
//!
//! let sphere = Primitive::Sphere(Sphere::new(Point3::new(0.0, 0.0, 5.0), 1.0));
//! let ray = Ray::new(Point3::origin(), Vec3::z());
//!
//! let mut t = f64::INFINITY;
//! assert!(intersect(&ray, &sphere, &mut t));
//! assert!((t - 4.0).abs() < 1e-12);
//! ```

pub mod aabb;
pub mod intersect;
mod material;
mod primitive;
pub mod project;
mod ray;
pub mod shading;

pub use aabb::{bounding_box, Aabb3, BoundingBox, CellRange};
pub use intersect::intersect;
pub use material::{Color, Light, Material};
pub use primitive::{Checker, Cone, Cylinder, Disk, Primitive, Rectangle, Shape, Sphere, Triangle};
pub use project::project;
pub use ray::Ray;
pub use shading::{normal, resolve_material};
