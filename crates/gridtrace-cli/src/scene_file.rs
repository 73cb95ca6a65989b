//! TOML scene description.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gridtrace_dynamics::DynamicsSettings;
use gridtrace_geom::{Light, Material, Primitive};
use gridtrace_grid::{GridSpec, UniformGrid};
use gridtrace_math::Point3;
use gridtrace_ply::{read_ply, MeshPlacement};
use gridtrace_raytrace::{Scene, Sensor, SensorSettings, TraceSettings};
use log::{debug, info};
use serde::Deserialize;

/// Everything a render needs, as written in a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    pub grid: GridSpec,
    /// Explicit sensor; takes precedence over `camera`.
    #[serde(default)]
    pub sensor: Option<SensorSettings>,
    #[serde(default)]
    pub camera: Option<Camera>,
    #[serde(default)]
    pub trace: TraceSettings,
    #[serde(default)]
    pub dynamics: DynamicsSettings,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub shapes: Vec<ShapeEntry>,
    #[serde(default)]
    pub meshes: Vec<MeshEntry>,
}

/// Orbit-style camera, expanded with [`SensorSettings::looking_at`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Camera {
    /// Point looked at; defaults to the grid centre.
    #[serde(default)]
    pub target: Option<Point3>,
    pub distance: f64,
    /// Tilt away from looking straight down, in degrees.
    pub elevation: f64,
    #[serde(default)]
    pub samples: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ShapeEntry {
    pub material: usize,
    pub primitive: Primitive,
}

/// A PLY file whose faces become triangles of one material.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshEntry {
    /// Relative paths are resolved against the scene file's directory.
    pub path: PathBuf,
    pub material: usize,
    #[serde(default)]
    pub placement: MeshPlacement,
}

/// A scene ready to render.
pub struct Loaded {
    pub scene: Scene,
    pub grid: UniformGrid,
    pub sensor: Sensor,
    pub trace: TraceSettings,
    pub dynamics: DynamicsSettings,
}

impl SceneFile {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Build the scene and its grid; `aspect` is the output width over height.
    pub fn load(self, base_dir: &Path, aspect: f64) -> Result<Loaded> {
        self.trace.validate()?;
        self.dynamics.validate()?;

        let mut primitives: Vec<(Primitive, usize)> = self.shapes.iter().map(|s| (s.primitive, s.material)).collect();
        for mesh in &self.meshes {
            let path = base_dir.join(&mesh.path);
            let triangles = read_ply(&path, &mesh.placement).with_context(|| format!("reading mesh {}", path.display()))?;
            info!("loaded {} triangles from {}", triangles.len(), path.display());
            primitives.extend(triangles.into_iter().map(|t| (Primitive::Triangle(t), mesh.material)));
        }

        let mut scene = Scene::new(self.materials, self.lights, primitives)?;
        let mut grid = UniformGrid::new(self.grid)?;
        grid.rebuild(scene.shapes_mut());

        let sensor_settings = match (self.sensor, self.camera) {
            (Some(sensor), _) => sensor,
            (None, camera) => {
                let centre = grid.bounds().center();
                let camera = camera.unwrap_or(Camera {
                    target: None,
                    distance: 2.0 * grid.bounds().size().norm(),
                    elevation: 45.0,
                    samples: None,
                });
                let mut settings = SensorSettings::looking_at(
                    camera.target.unwrap_or(centre),
                    camera.distance,
                    camera.elevation.to_radians(),
                    aspect,
                );
                if let Some(samples) = camera.samples {
                    settings.samples = samples;
                }
                settings
            }
        };
        let sensor = Sensor::new(sensor_settings)?;
        debug!("sensor: {:?}", sensor.settings());

        Ok(Loaded {
            scene,
            grid,
            sensor,
            trace: self.trace,
            dynamics: self.dynamics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
[grid]
min = [0.0, 0.0, 0.0]
max = [10.0, 10.0, 10.0]
cells = [8, 8, 8]

[camera]
distance = 30.0
elevation = 30.0

[trace]
surface_offset = 0.01
background = { red = 0.5, green = 0.75, blue = 0.9 }

[dynamics]
substeps = 4

[[materials]]
diffuse = { red = 1.0, green = 0.2, blue = 0.2 }
reflector = true
reflection = 0.3

[[materials]]
diffuse = { red = 0.9, green = 0.9, blue = 0.9 }
refractor = true
refraction = 0.9
eta = 1.5

[[lights]]
position = [5.0, -20.0, -20.0]
intensity = { red = 1.0, green = 1.0, blue = 1.0 }

[[shapes]]
material = 0
primitive = { type = "sphere", center = [5.0, 5.0, 5.0], radius = 2.0 }

[[shapes]]
material = 1
primitive = { type = "rectangle", center = [5.0, 9.0, 5.0], axes = [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]], lengths = [10.0, 10.0], checker = { alternate = 0, divisions = 8 } }
"#;

    #[test]
    fn test_parse_scene_file() {
        let file = SceneFile::from_toml(SCENE).unwrap();
        assert_eq!(file.grid.cells, [8, 8, 8]);
        assert!(file.sensor.is_none());
        assert_eq!(file.trace.surface_offset, 0.01);
        assert_eq!(file.trace.max_level, TraceSettings::default().max_level);
        assert_eq!(file.dynamics.substeps, 4);
        assert_eq!(file.dynamics.dt, DynamicsSettings::default().dt);
        assert_eq!(file.materials.len(), 2);
        assert_eq!(file.materials[1].eta, 1.5);
        assert_eq!(file.materials[0].eta, 1.0);
        assert_eq!(file.shapes[0].primitive.kind(), "sphere");
        match file.shapes[1].primitive {
            Primitive::Rectangle(r) => assert_eq!(r.checker.map(|c| c.divisions), Some(8)),
            other => panic!("expected rectangle, got {other:?}"),
        }
    }

    #[test]
    fn test_load_builds_grid_and_sensor() {
        let file = SceneFile::from_toml(SCENE).unwrap();
        let loaded = file.load(Path::new("."), 16.0 / 9.0).unwrap();
        assert_eq!(loaded.scene.shapes().len(), 2);
        assert!(loaded.grid.stats().entries > 0);
        assert_eq!(loaded.sensor.settings().samples, 1);
    }

    #[test]
    fn test_unknown_material_fails_to_load() {
        let text = SCENE.replace("material = 1", "material = 7");
        let file = SceneFile::from_toml(&text).unwrap();
        assert!(file.load(Path::new("."), 1.0).is_err());
    }

    #[test]
    fn test_missing_mesh_fails_to_load() {
        let text = format!("{SCENE}\n[[meshes]]\npath = \"no/such/mesh.ply\"\nmaterial = 0\n");
        let file = SceneFile::from_toml(&text).unwrap();
        assert_eq!(file.meshes[0].placement, MeshPlacement::default());
        assert!(file.load(Path::new("."), 1.0).is_err());
    }

    #[test]
    fn test_bundled_scene_loads() {
        let file = SceneFile::from_toml(include_str!("../../../scenes/spheres.toml")).unwrap();
        let loaded = file.load(Path::new("."), 16.0 / 9.0).unwrap();
        assert_eq!(loaded.scene.sphere_count(), 3);
        assert_eq!(loaded.trace.surface_offset, 0.1);
        assert_eq!(loaded.sensor.settings().samples, 4);
    }
}
