#![warn(missing_docs)]

//! Sphere dynamics for animated gridtrace scenes.
//!
//! Spheres move under gravity, collide with each other and bounce off
//! the static shapes around them. Contact search reuses the render grid:
//! every sphere only inspects the cells its bounding box covers, and the
//! grid is rebuilt after each substep so the next one sees fresh cells.
//!
//! # Architecture
//!
//! - [`collide`] - read-only, parallel contact detection producing one
//!   [`SphereResponse`] per sphere
//! - [`apply`] - Euler-forward position and velocity update
//! - [`step`] - a batch of substeps, each collide then apply then rebuild
//!
//! # Example
//!
//! ```ignore
//! use gridtrace_dynamics::{step, DynamicsSettings};
//!
//! grid.rebuild(scene.shapes_mut());
//! let stats = step(&mut grid, scene.shapes_mut(), &DynamicsSettings::default())?;
//! println!("{} sphere contacts", stats.sphere_contacts);
//! ```

mod collide;
pub mod error;

pub use collide::{apply, collide, SphereResponse};
pub use error::{DynamicsError, Result};

use gridtrace_geom::Shape;
use gridtrace_grid::UniformGrid;
use gridtrace_math::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for [`DynamicsSettings::max_sphere_contacts`].
pub const MAX_SPHERE_CONTACTS: usize = 1024;

/// Time stepping and contact parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsSettings {
    /// Time step of one substep.
    pub dt: f64,
    /// Constant acceleration applied to every sphere.
    pub gravity: Vec3,
    /// Substeps per call to [`step`].
    pub substeps: u32,
    /// Scale of the momentum exchanged between colliding spheres.
    pub sphere_restitution: f64,
    /// Multiple of the normal velocity removed when hitting a wall:
    /// 1 sticks, 2 is a perfect bounce.
    pub wall_restitution: f64,
    /// Most sphere contacts resolved per sphere and substep.
    pub max_sphere_contacts: usize,
}

impl Default for DynamicsSettings {
    fn default() -> Self {
        Self {
            dt: 0.025,
            gravity: Vec3::new(0.0, 1.0, 0.0),
            substeps: 40,
            sphere_restitution: 1.0,
            wall_restitution: 1.8,
            max_sphere_contacts: 8,
        }
    }
}

impl DynamicsSettings {
    /// Validate the settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(DynamicsError::InvalidTimeStep(self.dt));
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(DynamicsError::NonFinite("gravity"));
        }
        if !self.sphere_restitution.is_finite() {
            return Err(DynamicsError::NonFinite("sphere_restitution"));
        }
        if !self.wall_restitution.is_finite() {
            return Err(DynamicsError::NonFinite("wall_restitution"));
        }
        if self.max_sphere_contacts > MAX_SPHERE_CONTACTS {
            return Err(DynamicsError::TooManyContacts {
                got: self.max_sphere_contacts,
                max: MAX_SPHERE_CONTACTS,
            });
        }
        Ok(())
    }
}

/// Totals over one [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepStats {
    /// Substeps run.
    pub substeps: u32,
    /// Sphere-sphere contacts resolved, counted once per sphere involved.
    pub sphere_contacts: usize,
    /// Sphere-wall bounces.
    pub wall_contacts: usize,
}

/// Advance the spheres by `settings.substeps` substeps.
///
/// `grid` must be current for `shapes` on entry and is current again on
/// return. Each substep finishes its grid rebuild before the next one
/// reads contacts.
pub fn step(grid: &mut UniformGrid, shapes: &mut [Shape], settings: &DynamicsSettings) -> Result<StepStats> {
    settings.validate()?;
    let mut stats = StepStats::default();
    for _ in 0..settings.substeps {
        let responses = collide(grid, shapes, settings);
        stats.sphere_contacts += responses.iter().map(|r| r.sphere_contacts).sum::<usize>();
        stats.wall_contacts += responses.iter().filter(|r| r.wall.is_some()).count();
        apply(shapes, &responses, settings.dt);
        grid.rebuild(shapes);
        stats.substeps += 1;
    }
    debug!(
        "dynamics: {} substeps, {} sphere contacts, {} wall contacts",
        stats.substeps, stats.sphere_contacts, stats.wall_contacts
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gridtrace_geom::{Primitive, Rectangle, Sphere};
    use gridtrace_grid::GridSpec;
    use gridtrace_math::Point3;

    fn falling(velocity: Vec3) -> (UniformGrid, Vec<Shape>) {
        let mut shapes = vec![Shape::new(
            0,
            0,
            Primitive::Sphere(Sphere {
                center: Point3::new(5.0, 2.0, 5.0),
                radius: 0.5,
                velocity,
            }),
        )];
        let mut grid = UniformGrid::new(GridSpec::cube(10.0, 10)).unwrap();
        grid.rebuild(&mut shapes);
        (grid, shapes)
    }

    #[test]
    fn test_default_settings_validate() {
        assert!(DynamicsSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_time_step() {
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let s = DynamicsSettings {
                dt,
                ..DynamicsSettings::default()
            };
            assert!(matches!(s.validate(), Err(DynamicsError::InvalidTimeStep(_))));
        }
        let s = DynamicsSettings {
            gravity: Vec3::new(0.0, f64::NAN, 0.0),
            ..DynamicsSettings::default()
        };
        assert_eq!(s.validate(), Err(DynamicsError::NonFinite("gravity")));
    }

    #[test]
    fn test_rejects_huge_contact_limit() {
        let s = DynamicsSettings {
            max_sphere_contacts: usize::MAX,
            ..DynamicsSettings::default()
        };
        assert_eq!(
            s.validate(),
            Err(DynamicsError::TooManyContacts {
                got: usize::MAX,
                max: MAX_SPHERE_CONTACTS
            })
        );
        let (mut grid, mut shapes) = falling(Vec3::zeros());
        assert!(step(&mut grid, &mut shapes, &s).is_err());
    }

    #[test]
    fn test_free_fall_matches_euler() {
        let (mut grid, mut shapes) = falling(Vec3::zeros());
        let settings = DynamicsSettings {
            dt: 0.5,
            substeps: 2,
            ..DynamicsSettings::default()
        };
        let stats = step(&mut grid, &mut shapes, &settings).unwrap();
        assert_eq!(stats.substeps, 2);
        // Substep 1 moves by v = 0 then v = 0.5; substep 2 moves by 0.25.
        let s = shapes[0].primitive.as_sphere().unwrap();
        assert_relative_eq!(s.center, Point3::new(5.0, 2.25, 5.0), epsilon = 1e-12);
        assert_relative_eq!(s.velocity, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_grid_follows_moving_sphere() {
        let (mut grid, mut shapes) = falling(Vec3::new(4.0, 0.0, 0.0));
        let settings = DynamicsSettings {
            dt: 0.25,
            substeps: 3,
            gravity: Vec3::zeros(),
            ..DynamicsSettings::default()
        };
        step(&mut grid, &mut shapes, &settings).unwrap();
        // Centre moved from x = 5 to x = 8.
        assert_eq!(shapes[0].bbox.cells.min[0], 7);
        assert_eq!(grid.cell_contents([8, 2, 5]), &[0]);
        assert!(grid.cell_contents([5, 2, 5]).is_empty());
    }

    #[test]
    fn test_sphere_never_sinks_through_floor() {
        let (mut grid, mut shapes) = falling(Vec3::zeros());
        shapes.push(Shape::new(
            1,
            0,
            Primitive::Rectangle(Rectangle::new(Point3::new(5.0, 6.0, 5.0), Vec3::x(), Vec3::z(), 10.0, 10.0)),
        ));
        grid.rebuild(&mut shapes);
        let settings = DynamicsSettings {
            dt: 0.05,
            substeps: 400,
            ..DynamicsSettings::default()
        };
        let stats = step(&mut grid, &mut shapes, &settings).unwrap();
        assert!(stats.wall_contacts > 0);
        let s = shapes[0].primitive.as_sphere().unwrap();
        assert!(s.center.y < 6.0);
    }
}
