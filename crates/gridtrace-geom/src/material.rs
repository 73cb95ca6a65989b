//! Colors, surface materials and point lights.

use std::ops::{Add, AddAssign, Div, Mul};

use gridtrace_math::Point3;
use serde::{Deserialize, Serialize};

/// Linear RGB triple. Channels are nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub red: f64,
    /// Green channel.
    pub green: f64,
    /// Blue channel.
    pub blue: f64,
}

impl Color {
    /// All channels zero.
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    /// All channels one.
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// Create a color.
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Channels as an array.
    pub fn to_array(self) -> [f64; 3] {
        [self.red, self.green, self.blue]
    }

    /// True when every channel is finite.
    pub fn is_finite(&self) -> bool {
        self.red.is_finite() && self.green.is_finite() && self.blue.is_finite()
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, rhs: Color) -> Color {
        Color::new(self.red + rhs.red, self.green + rhs.green, self.blue + rhs.blue)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

impl Mul for Color {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        Color::new(self.red * rhs.red, self.green * rhs.green, self.blue * rhs.blue)
    }
}

impl Mul<f64> for Color {
    type Output = Color;
    fn mul(self, s: f64) -> Color {
        Color::new(self.red * s, self.green * s, self.blue * s)
    }
}

impl Div<f64> for Color {
    type Output = Color;
    fn div(self, s: f64) -> Color {
        Color::new(self.red / s, self.green / s, self.blue / s)
    }
}

/// Surface material.
///
/// The three flags are independent. A material that neither reflects nor
/// refracts would never shade anything, so [`Material::normalize`] turns it
/// into a reflector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Diffuse color.
    pub diffuse: Color,
    /// Weight applied to reflected child rays.
    #[serde(default)]
    pub reflection: f64,
    /// Transmission coefficient.
    #[serde(default)]
    pub refraction: f64,
    /// Refractive index.
    #[serde(default = "default_eta")]
    pub eta: f64,
    /// Emits light; paths end here.
    #[serde(default)]
    pub emitter: bool,
    /// Receives direct light and spawns mirror rays.
    #[serde(default)]
    pub reflector: bool,
    /// Spawns transmitted rays.
    #[serde(default)]
    pub refractor: bool,
}

fn default_eta() -> f64 {
    1.0
}

impl Material {
    /// Plain diffuse reflector.
    pub fn diffuse(diffuse: Color) -> Self {
        Self {
            diffuse,
            reflection: 0.0,
            refraction: 0.0,
            eta: 1.0,
            emitter: false,
            reflector: true,
            refractor: false,
        }
    }

    /// Builder-style reflection coefficient.
    pub fn with_reflection(mut self, reflection: f64) -> Self {
        self.reflection = reflection;
        self
    }

    /// Builder-style transmission with refractive index `eta`.
    pub fn with_refraction(mut self, refraction: f64, eta: f64) -> Self {
        self.refractor = true;
        self.refraction = refraction;
        self.eta = eta;
        self
    }

    /// Light source material.
    pub fn emitter(diffuse: Color) -> Self {
        Self {
            emitter: true,
            ..Self::diffuse(diffuse)
        }
    }

    /// Make the material usable: one with neither reflector nor refractor
    /// set becomes a reflector. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        if self.reflector || self.refractor {
            return false;
        }
        self.reflector = true;
        true
    }
}

/// A point light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Position.
    pub position: Point3,
    /// RGB intensity.
    pub intensity: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_ops() {
        let a = Color::new(0.5, 0.25, 1.0);
        let b = Color::new(2.0, 2.0, 0.5);
        assert_eq!(a * b, Color::new(1.0, 0.5, 0.5));
        assert_eq!(a * 2.0, Color::new(1.0, 0.5, 2.0));
        assert_eq!((a + b) / 2.0, Color::new(1.25, 1.125, 0.75));
        let mut c = Color::BLACK;
        c += a;
        assert_eq!(c, a);
    }

    #[test]
    fn test_normalize_defaults_to_reflector() {
        let mut m = Material {
            reflector: false,
            ..Material::diffuse(Color::WHITE)
        };
        assert!(m.normalize());
        assert!(m.reflector);
        assert!(!m.normalize());

        let mut glass = Material {
            reflector: false,
            ..Material::diffuse(Color::WHITE).with_refraction(1.0, 1.5)
        };
        assert!(!glass.normalize());
        assert!(!glass.reflector);
    }
}
