//! Thin-lens sensor mapping pixels to weighted primary rays.

use gridtrace_geom::Ray;
use gridtrace_math::{Point3, Transform, Vec3, NORM_EPSILON};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::{Result, SceneError};

/// Entries in the table of lens sample directions.
const LENS_TABLE_SIZE: usize = 10_000;

/// Stride through the lens table between successive samples of a pixel.
const SAMPLE_STRIDE: usize = 625;

/// Camera geometry and sampling.
///
/// The sensor is a rectangle centred at `eye + offset·n` spanned by
/// `i_dir` and `j_dir`, where `n = i_dir × j_dir`. Light reaches it
/// through a thin lens centred at `lens_center`; rays through the lens
/// centre meet the focal plane `x·n = focal_plane_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    /// Sensor centre before the normal offset.
    pub eye: Point3,
    /// Horizontal sensor axis.
    pub i_dir: Vec3,
    /// Vertical sensor axis.
    pub j_dir: Vec3,
    /// Sensor width along `i_dir`.
    pub i_length: f64,
    /// Sensor height along `j_dir`.
    pub j_length: f64,
    /// Shift of the sensor plane along its normal.
    pub offset: f64,
    /// Centre of the thin lens.
    pub lens_center: Point3,
    /// Focal plane position along the sensor normal.
    pub focal_plane_offset: f64,
    /// Radius of the lens disc sampled for depth of field.
    pub aperture_radius: f64,
    /// Rays per pixel; the first starts on the sensor itself.
    pub samples: u32,
    /// Weight of the first sample relative to the lens samples.
    pub primary_weight: f64,
    /// Seed for the lens sample table.
    pub seed: u64,
}

impl SensorSettings {
    /// Sensor looking at `target` from `distance` away, tilted `elevation`
    /// radians from straight down the vertical axis, with the focal plane
    /// through the target.
    ///
    /// `aspect` is width over height of the image to be rendered.
    pub fn looking_at(target: Point3, distance: f64, elevation: f64, aspect: f64) -> Self {
        let (s, c) = elevation.sin_cos();
        let eye = target + Vec3::new(0.0, -distance * c, -distance * s);
        let i_dir = Vec3::x();
        let j_dir = Vec3::new(0.0, s, -c);
        let n = i_dir.cross(&j_dir);
        let lens_distance = distance / 150.0;
        let i_length = 0.4 * lens_distance;
        Self {
            eye,
            i_dir,
            j_dir,
            i_length,
            j_length: i_length / aspect,
            offset: 0.0,
            lens_center: eye + lens_distance * n,
            focal_plane_offset: target.coords.dot(&n),
            aperture_radius: 0.4 * lens_distance,
            samples: 1,
            primary_weight: 2.0,
            seed: 0,
        }
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self::looking_at(Point3::origin(), 10.0, std::f64::consts::FRAC_PI_4, 16.0 / 9.0)
    }
}

/// A validated sensor with its pre-generated lens sample directions.
#[derive(Debug, Clone)]
pub struct Sensor {
    settings: SensorSettings,
    normal: Vec3,
    lens_table: Vec<[f64; 2]>,
}

impl Sensor {
    /// Validate the settings and build the lens table.
    pub fn new(mut settings: SensorSettings) -> Result<Self> {
        let invalid = |msg: String| Err(SceneError::InvalidSettings(msg));
        let (i_norm, j_norm) = (settings.i_dir.norm(), settings.j_dir.norm());
        if !(i_norm > NORM_EPSILON && j_norm > NORM_EPSILON) {
            return invalid("sensor axes must be non-zero".into());
        }
        settings.i_dir /= i_norm;
        settings.j_dir /= j_norm;
        let normal = settings.i_dir.cross(&settings.j_dir);
        if normal.norm() < NORM_EPSILON {
            return invalid("sensor axes must not be parallel".into());
        }
        let normal = normal.normalize();
        if !(settings.i_length > 0.0 && settings.j_length > 0.0) {
            return invalid(format!(
                "sensor lengths must be positive, got {} x {}",
                settings.i_length, settings.j_length
            ));
        }
        if settings.samples == 0 {
            return invalid("at least one sample per pixel is required".into());
        }
        if !(settings.primary_weight > 0.0) {
            return invalid(format!("primary_weight must be positive, got {}", settings.primary_weight));
        }
        if !(settings.aperture_radius >= 0.0) {
            return invalid(format!(
                "aperture_radius must be non-negative, got {}",
                settings.aperture_radius
            ));
        }
        let lens_depth = (settings.lens_center - settings.eye).dot(&normal) - settings.offset;
        if lens_depth.abs() < NORM_EPSILON {
            return invalid("lens centre lies in the sensor plane".into());
        }

        Ok(Self {
            settings,
            normal,
            lens_table: lens_table(settings.seed),
        })
    }

    /// The validated settings.
    pub fn settings(&self) -> &SensorSettings {
        &self.settings
    }

    /// Unit sensor normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Sum of the sample weights of one pixel.
    pub fn weight_sum(&self) -> f64 {
        self.settings.primary_weight + f64::from(self.settings.samples - 1)
    }

    /// Position of pixel `(i, j)` of an `ni × nj` image on the sensor.
    pub fn pixel_location(&self, ni: usize, nj: usize, i: usize, j: usize) -> Point3 {
        let s = &self.settings;
        let r = (unit_fraction(i, ni) - 0.5) * s.i_length;
        let q = (unit_fraction(j, nj) - 0.5) * s.j_length;
        s.eye + s.offset * self.normal + r * s.i_dir + q * s.j_dir
    }

    /// Weighted primary rays of pixel `(i, j)`.
    ///
    /// All samples aim at the point where the ray from the pixel through
    /// the lens centre crosses the focal plane. Sample 0 starts at the
    /// pixel and carries `primary_weight`; the rest start on the lens disc
    /// with weight 1. `rotation`, when given, moves every ray rigidly.
    pub fn primary_rays<'a>(
        &'a self,
        ni: usize,
        nj: usize,
        i: usize,
        j: usize,
        rotation: Option<&'a Transform>,
    ) -> impl Iterator<Item = (Ray, f64)> + 'a {
        let s = &self.settings;
        let pixel = self.pixel_location(ni, nj, i, j);
        let central = s.lens_center - pixel;
        let denom = central.dot(&self.normal);
        let alpha = if denom.abs() > NORM_EPSILON {
            (s.focal_plane_offset - pixel.coords.dot(&self.normal)) / denom
        } else {
            1.0
        };
        let target = pixel + alpha * central;
        let base = i + j * ni;

        (0..s.samples as usize).map(move |k| {
            let (start, weight) = if k == 0 {
                (pixel, s.primary_weight)
            } else {
                let [u, v] = self.lens_table[(base + k * SAMPLE_STRIDE) % self.lens_table.len()];
                let a = s.aperture_radius;
                (s.lens_center + a * u * s.i_dir + a * v * s.j_dir, 1.0)
            };
            let dir = target - start;
            let ray = match rotation {
                Some(t) => Ray::new(t.apply_point(&start), t.apply_vec(&dir)),
                None => Ray::new(start, dir),
            };
            (ray, weight)
        })
    }
}

/// `k / (n - 1)`, or the centre for a single pixel.
fn unit_fraction(k: usize, n: usize) -> f64 {
    if n <= 1 {
        0.5
    } else {
        k as f64 / (n - 1) as f64
    }
}

/// Unit-circle directions from a seeded generator.
fn lens_table(seed: u64) -> Vec<[f64; 2]> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut table = Vec::with_capacity(LENS_TABLE_SIZE);
    while table.len() < LENS_TABLE_SIZE {
        let u: f64 = rng.random_range(-1.0..1.0);
        let v: f64 = rng.random_range(-1.0..1.0);
        let r = u.hypot(v);
        if r > NORM_EPSILON {
            table.push([u / r, v / r]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat() -> SensorSettings {
        SensorSettings {
            eye: Point3::origin(),
            i_dir: Vec3::x(),
            j_dir: Vec3::y(),
            i_length: 2.0,
            j_length: 1.0,
            offset: 0.0,
            lens_center: Point3::new(0.0, 0.0, 1.0),
            focal_plane_offset: 10.0,
            aperture_radius: 0.5,
            samples: 4,
            primary_weight: 2.0,
            seed: 7,
        }
    }

    #[test]
    fn test_pixel_location_spans_sensor() {
        let sensor = Sensor::new(flat()).unwrap();
        assert_relative_eq!(sensor.pixel_location(3, 3, 0, 0), Point3::new(-1.0, -0.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(sensor.pixel_location(3, 3, 2, 2), Point3::new(1.0, 0.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(sensor.pixel_location(3, 3, 1, 1), Point3::origin(), epsilon = 1e-12);
        // A single pixel sits at the centre.
        assert_relative_eq!(sensor.pixel_location(1, 1, 0, 0), Point3::origin(), epsilon = 1e-12);
    }

    #[test]
    fn test_all_samples_meet_on_focal_plane() {
        let sensor = Sensor::new(flat()).unwrap();
        let rays: Vec<(Ray, f64)> = sensor.primary_rays(3, 3, 0, 2, None).collect();
        assert_eq!(rays.len(), 4);
        assert_eq!(rays[0].1, 2.0);
        assert!(rays[1..].iter().all(|(_, w)| *w == 1.0));
        assert_relative_eq!(rays[0].0.start, sensor.pixel_location(3, 3, 0, 2), epsilon = 1e-12);

        // Through the lens centre from (-1, 0.5, 0) the focus is at z = 10.
        let target = Point3::new(9.0, -4.5, 10.0);
        for (ray, _) in &rays {
            let t = (10.0 - ray.start.z) / ray.dir.z;
            assert_relative_eq!(ray.at(t), target, epsilon = 1e-9);
        }
        // Lens samples start on the aperture rim.
        for (ray, _) in &rays[1..] {
            let off = ray.start - Point3::new(0.0, 0.0, 1.0);
            assert_relative_eq!(off.norm(), 0.5, epsilon = 1e-12);
            assert_relative_eq!(off.z, 0.0, epsilon = 1e-12);
        }
        assert_relative_eq!(sensor.weight_sum(), 5.0);
    }

    #[test]
    fn test_lens_table_is_seeded() {
        let a: Vec<Ray> = Sensor::new(flat()).unwrap().primary_rays(4, 4, 1, 2, None).map(|r| r.0).collect();
        let b: Vec<Ray> = Sensor::new(flat()).unwrap().primary_rays(4, 4, 1, 2, None).map(|r| r.0).collect();
        assert_eq!(a, b);
        let table = lens_table(3);
        assert_eq!(table.len(), LENS_TABLE_SIZE);
        assert!(table.iter().all(|[u, v]| (u.hypot(*v) - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_rotation_moves_rays_rigidly() {
        let sensor = Sensor::new(flat()).unwrap();
        let pivot = Point3::new(0.0, 0.0, 5.0);
        let half_turn = Transform::orbit_y(std::f64::consts::PI, &pivot);
        let (plain, _) = sensor.primary_rays(1, 1, 0, 0, None).next().unwrap();
        let (turned, _) = sensor.primary_rays(1, 1, 0, 0, Some(&half_turn)).next().unwrap();
        assert_relative_eq!(turned.start, Point3::new(0.0, 0.0, 10.0), epsilon = 1e-9);
        assert_relative_eq!(turned.dir, -plain.dir, epsilon = 1e-9);
    }

    #[test]
    fn test_looking_at_focuses_on_target() {
        let target = Point3::new(5.0, 10.0, 5.0);
        let sensor = Sensor::new(SensorSettings::looking_at(target, 40.0, 0.7, 2.0)).unwrap();
        let n = sensor.normal();
        assert_relative_eq!(target.coords.dot(&n), sensor.settings().focal_plane_offset, epsilon = 1e-9);
        // The middle pixel looks straight at the target.
        let (ray, _) = sensor.primary_rays(1, 1, 0, 0, None).next().unwrap();
        let to_target = (target - ray.start).normalize();
        assert_relative_eq!(ray.dir, to_target, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_settings() {
        let mut s = flat();
        s.j_dir = Vec3::x() * 3.0;
        assert!(Sensor::new(s).is_err());

        let mut s = flat();
        s.samples = 0;
        assert!(Sensor::new(s).is_err());

        let mut s = flat();
        s.lens_center = Point3::new(3.0, 0.0, 0.0);
        assert!(Sensor::new(s).is_err());
    }
}
