//! Validated scene data shared read-only by every trace.

use gridtrace_geom::{Light, Material, Primitive, Shape};
use gridtrace_math::{Point3, Vec3, NORM_EPSILON};
use log::warn;

use crate::{Result, SceneError};

/// Smallest radius, height or side length a shape is allowed to keep.
const MIN_EXTENT: f64 = 1e-6;

/// Materials, lights and shapes of one scene.
///
/// Shape ids equal their positions in [`Scene::shapes`], which is what the
/// grid stores. Geometry is fixed after construction except for the sphere
/// positions and velocities the dynamics step updates through
/// [`Scene::shapes_mut`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    materials: Vec<Material>,
    lights: Vec<Light>,
    shapes: Vec<Shape>,
}

impl Scene {
    /// Build a scene from `(primitive, material index)` pairs.
    ///
    /// Materials with neither the reflector nor the refractor flag become
    /// reflectors, reflection coefficients are clamped to `[0, 1]` and an
    /// unusable refractive index becomes 1. Non-positive radii, heights
    /// and lengths are raised to a small minimum. Every correction is
    /// logged. Axes and normals are
    /// normalized; a zero-length one is an error, as is a reference to a
    /// material that does not exist.
    pub fn new<I>(mut materials: Vec<Material>, lights: Vec<Light>, shapes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Primitive, usize)>,
    {
        for (index, material) in materials.iter_mut().enumerate() {
            if !material.diffuse.is_finite() {
                return Err(SceneError::NonFiniteMaterial {
                    material: index,
                    field: "diffuse",
                });
            }
            if material.normalize() {
                warn!("material {index} has neither reflector nor refractor set; treating it as a reflector");
            }
            if !(0.0..=1.0).contains(&material.reflection) {
                let clamped = if material.reflection > 1.0 { 1.0 } else { 0.0 };
                warn!("material {index} reflection {} outside [0, 1]; using {clamped}", material.reflection);
                material.reflection = clamped;
            }
            if !(material.eta.is_finite() && material.eta > 0.0) {
                warn!("material {index} has refractive index {}; using 1", material.eta);
                material.eta = 1.0;
            }
        }

        for (index, light) in lights.iter().enumerate() {
            if !light.position.iter().all(|c| c.is_finite()) {
                return Err(SceneError::NonFiniteLight {
                    light: index,
                    field: "position",
                });
            }
            if !light.intensity.is_finite() {
                return Err(SceneError::NonFiniteLight {
                    light: index,
                    field: "intensity",
                });
            }
        }

        let shapes = shapes
            .into_iter()
            .enumerate()
            .map(|(id, (primitive, material))| {
                check_material(id, material, materials.len())?;
                if let Primitive::Rectangle(r) = &primitive {
                    if let Some(checker) = r.checker {
                        check_material(id, checker.alternate, materials.len())?;
                    }
                }
                let primitive = sanitize(id, primitive)?;
                Ok(Shape::new(id, material, primitive))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            materials,
            lights,
            shapes,
        })
    }

    /// Material table.
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Point lights.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Shapes, indexed by id.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Mutable shapes for the dynamics step and grid rebuilds.
    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    /// Number of sphere shapes.
    pub fn sphere_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.primitive.as_sphere().is_some()).count()
    }
}

fn check_material(shape: usize, material: usize, available: usize) -> Result<()> {
    if material >= available {
        return Err(SceneError::UnknownMaterial {
            shape,
            material,
            available,
        });
    }
    Ok(())
}

/// Normalize directions, clamp extents and reject non-finite geometry.
fn sanitize(id: usize, primitive: Primitive) -> Result<Primitive> {
    let kind = primitive.kind();
    let finite_point = |p: &Point3| -> Result<()> {
        if p.iter().all(|c| c.is_finite()) {
            Ok(())
        } else {
            Err(SceneError::NonFinite { shape: id, kind })
        }
    };
    let unit = |v: &Vec3| -> Result<Vec3> {
        if !v.iter().all(|c| c.is_finite()) {
            return Err(SceneError::NonFinite { shape: id, kind });
        }
        let n = v.norm();
        if n < NORM_EPSILON {
            return Err(SceneError::DegenerateAxis { shape: id, kind });
        }
        Ok(v / n)
    };
    let extent = |name: &str, value: f64| -> Result<f64> {
        if value.is_infinite() {
            return Err(SceneError::NonFinite { shape: id, kind });
        }
        if value > MIN_EXTENT {
            return Ok(value);
        }
        warn!("shape {id} ({kind}) has {name} {value}; clamping to {MIN_EXTENT}");
        Ok(MIN_EXTENT)
    };

    let out = match primitive {
        Primitive::Sphere(mut s) => {
            finite_point(&s.center)?;
            if !s.velocity.iter().all(|c| c.is_finite()) {
                return Err(SceneError::NonFinite { shape: id, kind });
            }
            s.radius = extent("radius", s.radius)?;
            Primitive::Sphere(s)
        }
        Primitive::Disk(mut d) => {
            finite_point(&d.center)?;
            d.normal = unit(&d.normal)?;
            d.radius = extent("radius", d.radius)?;
            Primitive::Disk(d)
        }
        Primitive::Cylinder(mut c) => {
            finite_point(&c.center)?;
            c.axis = unit(&c.axis)?;
            c.radius = extent("radius", c.radius)?;
            c.height = extent("height", c.height)?;
            Primitive::Cylinder(c)
        }
        Primitive::Cone(mut c) => {
            finite_point(&c.vertex)?;
            c.axis = unit(&c.axis)?;
            c.radius = extent("radius", c.radius)?;
            c.height = extent("height", c.height)?;
            Primitive::Cone(c)
        }
        Primitive::Triangle(t) => {
            for v in &t.vertices {
                finite_point(v)?;
            }
            Primitive::Triangle(t)
        }
        Primitive::Rectangle(mut r) => {
            finite_point(&r.center)?;
            r.axes = [unit(&r.axes[0])?, unit(&r.axes[1])?];
            if r.axes[0].cross(&r.axes[1]).norm() < NORM_EPSILON {
                return Err(SceneError::DegenerateAxis { shape: id, kind });
            }
            r.lengths = [extent("length", r.lengths[0])?, extent("length", r.lengths[1])?];
            Primitive::Rectangle(r)
        }
    };
    Ok(out)
}
