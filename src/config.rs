use crate::canvas::{Glow, Rgba};

/// Teal used by every particle, glow and link.
pub const TEAL: (u8, u8, u8) = (45, 212, 191);

/// Strategy for finding particle pairs closer than the link distance
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PairScan {
    /// Check every pair, `O(n²)`
    Brute,
    /// Bucket particles into a uniform grid first
    Grid,
}

/// Every tunable of the particle field
#[derive(Clone, Copy, Debug)]
pub struct FieldConfig {
    /// Surface area (in pixels²) per particle
    pub pixels_per_particle: u64,

    /// Half open `(min, max)` range of resting radii
    pub base_size: (f64, f64),
    /// Half open `(min, max)` range of each velocity axis
    pub speed: (f64, f64),

    /// Pointer distance below which particles are pushed and grown
    pub repel_radius: f64,
    pub repel_strength: f64,
    /// Extra radius at full force, as a multiple of the base size
    pub size_gain: f64,

    pub pointer_link_distance: f64,
    pub pointer_link_alpha: f32,
    pub pointer_link_width: f64,

    pub pair_link_distance: f64,
    pub pair_link_alpha: f32,
    pub pair_link_width: f64,

    pub color: Rgba,
    pub glow: Glow,

    pub pair_scan: PairScan,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            pixels_per_particle: 10_000,

            base_size: (0.5, 2.0),
            speed: (-0.2, 0.2),

            repel_radius: 150.0,
            repel_strength: 1.2,
            size_gain: 2.0,

            pointer_link_distance: 180.0,
            pointer_link_alpha: 0.1,
            pointer_link_width: 0.5,

            pair_link_distance: 100.0,
            pair_link_alpha: 0.08,
            pair_link_width: 0.4,

            color: Rgba::from_rgb8(TEAL, 0.25),
            glow: Glow {
                blur: 4.0,
                color: Rgba::from_rgb8(TEAL, 0.4),
            },

            pair_scan: PairScan::Brute,
        }
    }
}

impl FieldConfig {
    /// Number of particles for a surface of the given size
    pub fn particle_count(&self, width: u32, height: u32) -> usize {
        if self.pixels_per_particle == 0 {
            return 0;
        }

        (width as u64 * height as u64 / self.pixels_per_particle) as usize
    }

    /// Link colour at `distance`, fading linearly to transparent at `max_distance`
    pub fn link_color(&self, max_alpha: f32, distance: f64, max_distance: f64) -> Rgba {
        let fade = (1.0 - distance / max_distance) as f32;
        self.color.with_alpha(max_alpha * fade)
    }
}
