use glam::DVec2;
use rand::Rng;

use crate::config::FieldConfig;

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    pub base_size: f64,
    pub size: f64,
}

impl Particle {
    pub fn new(position: DVec2, velocity: DVec2, base_size: f64) -> Self {
        Self {
            position,
            velocity,
            base_size,
            size: base_size,
        }
    }

    /// Random particle somewhere on a `surface` sized area
    pub fn random<R: Rng + ?Sized>(rng: &mut R, surface: DVec2, config: &FieldConfig) -> Self {
        let position = DVec2::new(sample(rng, (0.0, surface.x)), sample(rng, (0.0, surface.y)));
        let velocity = DVec2::new(sample(rng, config.speed), sample(rng, config.speed));

        Self::new(position, velocity, sample(rng, config.base_size))
    }

    /// Advance one frame: drift, wrap around the surface, then react to the pointer
    pub fn update(&mut self, surface: DVec2, pointer: Option<DVec2>, config: &FieldConfig) {
        self.position = wrap(self.position + self.velocity, surface);
        self.size = self.base_size;

        let Some(pointer) = pointer else {
            return;
        };

        let away = self.position - pointer;
        let distance = away.length();
        if distance < config.repel_radius {
            let force = (config.repel_radius - distance) / config.repel_radius;

            // Sitting right on the pointer there is no direction to push in
            if distance > 0.0 {
                self.position += away / distance * force * config.repel_strength;
                self.position = wrap(self.position, surface);
            }

            self.size = self.base_size * (1.0 + force * config.size_gain);
        }
    }
}

/// Toroidal wrap of both axes into `[0, surface)`
pub fn wrap(position: DVec2, surface: DVec2) -> DVec2 {
    DVec2::new(wrap_axis(position.x, surface.x), wrap_axis(position.y, surface.y))
}

fn wrap_axis(value: f64, extent: f64) -> f64 {
    if extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }

    // Leaving past the far edge re-enters at the near one
    if value >= extent {
        return 0.0;
    }

    if value < 0.0 {
        let wrapped = value.rem_euclid(extent);
        // Tiny negative values round up to `extent`
        return if wrapped >= extent { 0.0 } else { wrapped };
    }

    value
}

/// Uniform sample that tolerates empty ranges
fn sample<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    if min < max {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const SURFACE: DVec2 = DVec2::new(800.0, 600.0);

    fn at_rest(x: f64, y: f64) -> Particle {
        Particle::new(DVec2::new(x, y), DVec2::ZERO, 1.0)
    }

    #[test]
    fn random_particles_stay_in_ranges() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let p = Particle::random(&mut rng, SURFACE, &config);
            assert!((0.0..800.0).contains(&p.position.x));
            assert!((0.0..600.0).contains(&p.position.y));
            assert!((0.5..2.0).contains(&p.base_size));
            assert!((-0.2..0.2).contains(&p.velocity.x));
            assert!((-0.2..0.2).contains(&p.velocity.y));
            assert_eq!(p.size, p.base_size);
        }
    }

    #[test]
    fn random_on_empty_surface_sits_at_origin() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let p = Particle::random(&mut rng, DVec2::ZERO, &config);
        assert_eq!(p.position, DVec2::ZERO);
    }

    #[test]
    fn wraps_to_opposite_edge() {
        let config = FieldConfig::default();

        let mut p = Particle::new(DVec2::new(799.9, 599.9), DVec2::new(0.2, 0.2), 1.0);
        p.update(SURFACE, None, &config);
        assert_eq!(p.position, DVec2::ZERO);

        let mut p = Particle::new(DVec2::new(799.9, 300.0), DVec2::new(0.2, 0.0), 1.0);
        p.update(SURFACE, None, &config);
        assert_eq!(p.position, DVec2::new(0.0, 300.0));

        let mut p = Particle::new(DVec2::new(0.1, 0.1), DVec2::new(-0.2, -0.2), 1.0);
        p.update(SURFACE, None, &config);
        assert!((p.position.x - 799.9).abs() < 1e-9);
        assert!((p.position.y - 599.9).abs() < 1e-9);
    }

    #[test]
    fn wrap_never_reaches_extent() {
        assert_eq!(wrap_axis(800.0, 800.0), 0.0);
        assert_eq!(wrap_axis(1234.5, 800.0), 0.0);
        assert_eq!(wrap_axis(0.0, 800.0), 0.0);
        assert_eq!(wrap_axis(799.5, 800.0), 799.5);
        assert_eq!(wrap_axis(-1e-20, 800.0), 0.0);
        assert!(wrap_axis(-1e-9, 800.0) < 800.0);
        assert_eq!(wrap_axis(5.0, 0.0), 0.0);
        assert_eq!(wrap_axis(f64::NAN, 800.0), 0.0);
    }

    #[test]
    fn positions_stay_inside_over_many_steps() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut particles: Vec<_> = (0..200)
            .map(|_| Particle::random(&mut rng, SURFACE, &config))
            .collect();

        for step in 0..5000 {
            // Let the pointer sweep across the edges too
            let pointer = DVec2::new((step % 900) as f64 - 50.0, (step % 700) as f64 - 50.0);
            for p in &mut particles {
                p.update(SURFACE, Some(pointer), &config);
                assert!(p.position.x >= 0.0 && p.position.x < SURFACE.x);
                assert!(p.position.y >= 0.0 && p.position.y < SURFACE.y);
            }
        }
    }

    #[test]
    fn pointer_pushes_away_and_grows() {
        let config = FieldConfig::default();
        let mut p = at_rest(100.0, 0.0);
        p.update(SURFACE, Some(DVec2::ZERO), &config);

        let force = 50.0 / 150.0;
        assert!((p.position.x - (100.0 + force * 1.2)).abs() < 1e-9);
        assert_eq!(p.position.y, 0.0);
        assert!((p.size - (1.0 + force * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn no_force_at_or_beyond_radius() {
        let config = FieldConfig::default();
        for x in [150.0, 151.0, 400.0] {
            let mut p = at_rest(x, 300.0);
            p.update(SURFACE, Some(DVec2::new(0.0, 300.0)), &config);
            assert_eq!(p.position.x, x);
            assert_eq!(p.size, p.base_size);
        }
    }

    #[test]
    fn size_grows_as_pointer_gets_closer() {
        let config = FieldConfig::default();
        let pointer = DVec2::new(400.0, 300.0);

        let mut previous = 1.0;
        for distance in [149.0, 120.0, 80.0, 40.0, 10.0, 1.0] {
            let mut p = at_rest(400.0 + distance, 300.0);
            p.update(SURFACE, Some(pointer), &config);
            assert!(p.size > previous, "{} at {distance}", p.size);
            previous = p.size;
        }
    }

    #[test]
    fn zero_distance_grows_without_moving() {
        let config = FieldConfig::default();
        let mut p = at_rest(400.0, 300.0);
        p.update(SURFACE, Some(DVec2::new(400.0, 300.0)), &config);

        assert_eq!(p.position, DVec2::new(400.0, 300.0));
        assert_eq!(p.size, 3.0);
    }

    #[test]
    fn size_resets_once_pointer_leaves() {
        let config = FieldConfig::default();
        let mut p = at_rest(400.0, 300.0);
        p.update(SURFACE, Some(DVec2::new(410.0, 300.0)), &config);
        assert!(p.size > p.base_size);

        p.update(SURFACE, Some(DVec2::new(-1000.0, -1000.0)), &config);
        assert_eq!(p.size, p.base_size);
    }

    #[test]
    fn velocity_is_never_changed() {
        let config = FieldConfig::default();
        let velocity = DVec2::new(0.1, -0.15);
        let mut p = Particle::new(DVec2::new(50.0, 50.0), velocity, 1.0);
        for _ in 0..100 {
            p.update(SURFACE, Some(DVec2::new(60.0, 60.0)), &config);
        }
        assert_eq!(p.velocity, velocity);
    }
}
