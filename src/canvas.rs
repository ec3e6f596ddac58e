//! The drawing surface the field renders into.
//!
//! Coordinates are surface pixels with the origin at the top left corner.

use glam::DVec2;

#[derive(bytemuck::Zeroable, bytemuck::Pod, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 8-bit channels with a `0..=1` alpha, like CSS `rgba()`
    pub fn from_rgb8((r, g, b): (u8, u8, u8), a: f32) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Soft halo around a filled shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub blur: f64,
    pub color: Rgba,
}

pub trait Canvas {
    /// Erase everything drawn so far
    fn clear(&mut self);

    fn fill_circle(&mut self, center: DVec2, radius: f64, fill: Rgba, glow: Glow);

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba);
}

#[cfg(test)]
pub use recorder::{Command, Recorder};
