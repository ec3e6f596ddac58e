use std::time::{Duration, Instant};

/// Measures frame times and optionally caps the frame rate
pub struct Framepacer {
    frame_start: Instant,
    started: bool,
    last_frametime: f32,
    average_frametime: f32,
    limit: Option<Duration>,
}

impl Framepacer {
    /// Weight of the newest frame in the running average
    const SMOOTHING: f32 = 0.1;

    pub fn new(framerate: Option<u32>) -> Self {
        Self {
            frame_start: Instant::now(),
            started: false,
            last_frametime: 0.0,
            average_frametime: 0.0,
            limit: framerate
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / fps as f64)),
        }
    }

    /// Seconds between the last two frame starts
    pub fn frametime(&self) -> f32 {
        self.last_frametime
    }

    /// Smoothed frames per second
    pub fn framerate(&self) -> f32 {
        if self.average_frametime > f32::EPSILON {
            1.0 / self.average_frametime
        } else {
            0.0
        }
    }

    /// Starts a frame, the time since the previous start is its frame time
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        if self.started {
            self.record(now.duration_since(self.frame_start).as_secs_f32());
        }

        self.frame_start = now;
        self.started = true;
    }

    /// Sleeps off what is left of the frame budget
    pub fn end_frame(&mut self) {
        if let Some(limit) = self.limit {
            const ACCURACY: Duration = Duration::from_micros(100);
            let elapsed = self.frame_start.elapsed();

            if let Some(sleep_time) = limit.checked_sub(elapsed + ACCURACY) {
                std::thread::sleep(sleep_time);

                while self.frame_start.elapsed() < limit {
                    std::thread::yield_now();
                }
            }
        }
    }

    fn record(&mut self, frametime: f32) {
        self.last_frametime = frametime;
        self.average_frametime = if self.average_frametime == 0.0 {
            frametime
        } else {
            self.average_frametime + (frametime - self.average_frametime) * Self::SMOOTHING
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_framerate_is_uncapped() {
        assert!(Framepacer::new(Some(0)).limit.is_none());
        assert!(Framepacer::new(None).limit.is_none());
    }

    #[test]
    fn capped_frame_takes_its_budget() {
        let mut pacer = Framepacer::new(Some(100));
        pacer.begin_frame();
        pacer.end_frame();
        pacer.begin_frame();
        assert!(pacer.frametime() >= 0.01);
    }

    #[test]
    fn first_frame_has_no_frametime() {
        let mut pacer = Framepacer::new(None);
        pacer.begin_frame();
        assert_eq!(pacer.frametime(), 0.0);
        assert_eq!(pacer.framerate(), 0.0);
    }

    #[test]
    fn time_outside_the_frame_counts() {
        let mut pacer = Framepacer::new(None);
        for _ in 0..30 {
            pacer.begin_frame();
            pacer.end_frame();
            // Stands in for waiting on vsync while presenting
            std::thread::sleep(Duration::from_millis(16));
        }

        assert!(pacer.frametime() >= 0.016);
        let fps = pacer.framerate();
        assert!(fps > 0.0 && fps < 63.0, "{fps}");
    }

    #[test]
    fn framerate_is_smoothed() {
        let mut pacer = Framepacer::new(None);
        assert_eq!(pacer.framerate(), 0.0);

        pacer.record(0.02);
        assert!((pacer.framerate() - 50.0).abs() < 1e-3);

        pacer.record(0.01);
        assert!(pacer.framerate() > 50.0 && pacer.framerate() < 100.0);
    }
}
