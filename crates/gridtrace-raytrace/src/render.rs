//! Parallel image rendering.

use gridtrace_geom::Color;
use gridtrace_grid::UniformGrid;
use gridtrace_math::Transform;
use rayon::prelude::*;

use crate::{trace, Scene, Sensor, TraceSettings};

/// A rendered image, rows stored top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Row-major pixel colors.
    pub pixels: Vec<Color>,
}

impl Frame {
    /// A frame filled with one color.
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Color at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(x + y * self.width).copied()
    }

    /// Interleaved 8-bit RGB, each channel scaled by 255 and clamped.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| c.to_array().map(channel_to_u8))
            .collect()
    }
}

fn channel_to_u8(v: f64) -> u8 {
    // `as` saturates and maps NaN to 0.
    (v * 255.0).clamp(0.0, 255.0) as u8
}

/// Renders frames of a scene through a sensor.
///
/// Holds shared references only; the grid must not be rebuilt while a
/// renderer borrowing it exists.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    scene: &'a Scene,
    grid: &'a UniformGrid,
    sensor: &'a Sensor,
    settings: &'a TraceSettings,
}

impl<'a> Renderer<'a> {
    /// Create a renderer.
    pub fn new(scene: &'a Scene, grid: &'a UniformGrid, sensor: &'a Sensor, settings: &'a TraceSettings) -> Self {
        Self {
            scene,
            grid,
            sensor,
            settings,
        }
    }

    /// Render a `width × height` frame, rows in parallel.
    ///
    /// Sensor row `j` lands in image row `height − 1 − j`, since the lens
    /// inverts the image vertically.
    pub fn render(&self, width: usize, height: usize, rotation: Option<&Transform>) -> Frame {
        let mut frame = Frame::filled(width, height, Color::BLACK);
        if width == 0 || height == 0 {
            return frame;
        }
        frame
            .pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, pixels)| {
                let j = height - 1 - row;
                for (i, px) in pixels.iter_mut().enumerate() {
                    *px = self.pixel(width, height, i, j, rotation);
                }
            });
        frame
    }

    /// Weighted mean of the sample traces of sensor pixel `(i, j)`.
    pub fn pixel(&self, width: usize, height: usize, i: usize, j: usize, rotation: Option<&Transform>) -> Color {
        let mut sum = Color::BLACK;
        for (ray, weight) in self.sensor.primary_rays(width, height, i, j, rotation) {
            sum += trace(self.scene, self.grid, &ray, self.settings) * weight;
        }
        sum / self.sensor.weight_sum()
    }
}
