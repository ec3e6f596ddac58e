//! The particle field simulator
//!
//! A [`ParticleField`] owns its particles, the last pointer position and the
//! surface size. The host forwards resize and pointer events to it and calls
//! [`ParticleField::frame`] whenever [`ParticleField::wants_frame`] asks for one.

use glam::DVec2;
use log::debug;
use rand::rngs::StdRng;

use crate::{canvas::Canvas, config::FieldConfig, particle::Particle, spatial};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// What the last frame drew
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub pointer_links: usize,
    pub pair_links: usize,
}

pub struct ParticleField {
    pub config: FieldConfig,

    particles: Vec<Particle>,
    pointer: Option<DVec2>,
    surface: DVec2,
    rng: StdRng,

    lifecycle: Lifecycle,
    frame_requested: bool,
    stats: FrameStats,

    // Reused between frames
    positions: Vec<DVec2>,
}

impl ParticleField {
    pub fn new(config: FieldConfig, rng: StdRng) -> Self {
        Self {
            config,

            particles: Vec::new(),
            pointer: None,
            surface: DVec2::ZERO,
            rng,

            lifecycle: Lifecycle::Created,
            frame_requested: false,
            stats: FrameStats::default(),

            positions: Vec::new(),
        }
    }

    /// Size the field to the surface and request the first frame
    pub fn start(&mut self, width: u32, height: u32) {
        self.on_resize(width, height);
        self.lifecycle = Lifecycle::Running;
        self.frame_requested = true;
    }

    /// Throw away every particle and fill the new surface from scratch
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.surface = DVec2::new(width as f64, height as f64);

        let previous = self.particles.len();
        self.reseed();
        debug!(
            "Resized to {}x{}, {} -> {} particles",
            width,
            height,
            previous,
            self.particles.len()
        );
    }

    /// New particles for the current surface
    pub fn reseed(&mut self) {
        let count = self
            .config
            .particle_count(self.surface.x as u32, self.surface.y as u32);

        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = Particle::random(&mut self.rng, self.surface, &self.config);
            self.particles.push(particle);
        }
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.pointer = Some(DVec2::new(x, y));
    }

    /// Cancel the pending frame, nothing is updated or drawn until [`Self::resume`]
    pub fn stop(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            self.lifecycle = Lifecycle::Stopped;
        }
        self.frame_requested = false;
    }

    /// Continue a stopped field with the particles it had
    pub fn resume(&mut self) {
        if self.lifecycle == Lifecycle::Stopped {
            self.lifecycle = Lifecycle::Running;
            self.frame_requested = true;
        }
    }

    pub fn dispose(mut self) {
        self.stop();
        self.particles.clear();
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn wants_frame(&self) -> bool {
        self.frame_requested
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Run the pending frame, if there is one
    pub fn frame<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> bool {
        if !self.frame_requested {
            return false;
        }

        self.frame_requested = false;
        self.step(canvas);
        self.frame_requested = self.is_running();

        true
    }

    fn step<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        let config = &self.config;
        canvas.clear();

        for particle in &mut self.particles {
            particle.update(self.surface, self.pointer, config);
            canvas.fill_circle(particle.position, particle.size, config.color, config.glow);
        }

        let mut stats = FrameStats {
            particles: self.particles.len(),
            ..Default::default()
        };

        if let Some(pointer) = self.pointer {
            let max_distance = config.pointer_link_distance;
            for particle in &self.particles {
                let distance = particle.position.distance(pointer);
                if distance < max_distance {
                    let color =
                        config.link_color(config.pointer_link_alpha, distance, max_distance);
                    canvas.stroke_line(particle.position, pointer, config.pointer_link_width, color);
                    stats.pointer_links += 1;
                }
            }
        }

        self.positions.clear();
        self.positions
            .extend(self.particles.iter().map(|p| p.position));

        let max_distance = config.pair_link_distance;
        let positions = &self.positions;
        spatial::for_each_pair_within(config.pair_scan, positions, max_distance, |i, j, d| {
            let color = config.link_color(config.pair_link_alpha, d, max_distance);
            canvas.stroke_line(positions[i], positions[j], config.pair_link_width, color);
            stats.pair_links += 1;
        });

        self.stats = stats;
    }
}
