#![warn(missing_docs)]

//! Light transport for the gridtrace renderer.
//!
//! A [`Scene`] owns validated materials, lights and shapes. The trace
//! engine follows one primary ray through a [`UniformGrid`], gathering
//! direct light with shadow rays and spawning reflected and refracted
//! children into a fixed-capacity FIFO queue. The [`Renderer`] maps
//! sensor pixels to primary rays and traces rows in parallel.
//!
//! # Architecture
//!
//! - [`Scene`] - materials, lights and shapes, checked and normalized
//!   once at build time
//! - [`trace`] - bounded, non-recursive shading of a single primary ray
//! - [`Sensor`] - thin-lens camera producing weighted primary rays
//! - [`Renderer`] - parallel-over-rows driver producing a [`Frame`]
//!
//! # Example
//!
//! ```ignore
//! use gridtrace_grid::{GridSpec, UniformGrid};
//! use gridtrace_raytrace::{Renderer, Scene, Sensor, SensorSettings, TraceSettings};
//!
//! let mut scene = Scene::new(materials, lights, shapes)?;
//! let mut grid = UniformGrid::new(GridSpec::cube(2048.0, 100))?;
//! grid.rebuild(scene.shapes_mut());
//!
//! let sensor = Sensor::new(SensorSettings::default())?;
//! let settings = TraceSettings::default();
//! let frame = Renderer::new(&scene, &grid, &sensor, &settings).render(640, 360, None);
//! let rgb = frame.to_rgb8();
//! ```
//!
//! [`UniformGrid`]: gridtrace_grid::UniformGrid

pub mod error;
mod render;
mod scene;
mod sensor;
mod trace;

pub use error::{Result, SceneError};
pub use render::{Frame, Renderer};
pub use scene::Scene;
pub use sensor::{Sensor, SensorSettings};
pub use trace::{trace, trace_with_stats, TraceStats};

use gridtrace_geom::Color;
use serde::{Deserialize, Serialize};

/// Deepest reflection/refraction generation the queue is sized for.
pub const MAX_LEVEL: u32 = 4;

/// Capacity of the per-pixel ray queue.
pub const MAX_RAYS: usize = 2 << MAX_LEVEL;

/// Settings for tracing a single ray tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Generations of rays traced; children are spawned only while
    /// `level + 1 < max_level`. Clamped to [`MAX_LEVEL`].
    pub max_level: u32,
    /// Distance a secondary ray start is pushed off the surface.
    pub surface_offset: f64,
    /// Color of primary rays that hit nothing.
    pub background: Color,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
            surface_offset: 1e-3,
            background: Color::BLACK,
        }
    }
}

impl TraceSettings {
    /// Validate the settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.surface_offset.is_finite() && self.surface_offset > 0.0) {
            return Err(SceneError::InvalidSettings(format!(
                "surface_offset must be positive, got {}",
                self.surface_offset
            )));
        }
        if !self.background.is_finite() {
            return Err(SceneError::InvalidSettings("background color must be finite".into()));
        }
        Ok(())
    }

    /// `max_level` limited to what the queue can hold.
    pub fn effective_max_level(&self) -> u32 {
        self.max_level.min(MAX_LEVEL)
    }
}
