use std::time::{Duration, Instant};

pub const MIN_FPS: f64 = 1.;

/// Seconds per frame for an estimated frame rate, with the rate clamped to
/// `[MIN_FPS, max_fps]`. An unknown (NaN) rate counts as `MIN_FPS`.
pub fn time_step(fps: f64, max_fps: f64) -> f64 {
    let max_fps = max_fps.max(MIN_FPS);
    let fps = if fps.is_nan() { MIN_FPS } else { fps };
    1. / fps.clamp(MIN_FPS, max_fps)
}

/// Counts frames between samples and turns them into a frames-per-second
/// estimate once more than `window` has passed.
#[derive(Clone, Debug)]
pub struct FrameRateEstimator {
    window: Duration,
    last_frames: u64,
    last_time: Instant,
}

impl FrameRateEstimator {
    pub fn new(window: Duration, start: Instant) -> Self {
        Self {
            window,
            last_frames: 0,
            last_time: start,
        }
    }

    pub fn sample(&mut self, frames: u64, now: Instant) -> Option<f64> {
        let elapsed = now.saturating_duration_since(self.last_time);
        if elapsed <= self.window {
            return None;
        }
        let elapsed_ms = elapsed.as_millis().max(1) as f64;
        let counted = frames.saturating_sub(self.last_frames) as f64;
        self.last_frames = frames;
        self.last_time = now;
        Some(counted * 1000. / elapsed_ms)
    }
}

#[cfg(test)]
mod clock_tests {
    use super::*;

    fn assert_feq(left: f64, right: f64) {
        if (left - right).abs() > 1e-9 {
            panic!("Float equal assertion failed, {left} != {right}");
        }
    }

    #[test]
    fn step_from_rate() {
        assert_feq(time_step(50., 1000.), 0.02);
        assert_feq(time_step(1000., 1000.), 0.001);
    }

    #[test]
    fn degenerate_rates_are_clamped() {
        assert_feq(time_step(0., 1000.), 1.);
        assert_feq(time_step(-20., 1000.), 1.);
        assert_feq(time_step(f64::NAN, 1000.), 1.);
        assert_feq(time_step(f64::NEG_INFINITY, 1000.), 1.);
        assert_feq(time_step(1e9, 1000.), 0.001);
        assert_feq(time_step(10., 0.), 1.);
    }

    #[test]
    fn unbounded_rate_gives_smallest_step() {
        assert_feq(time_step(f64::INFINITY, 1000.), 0.001);
        assert_feq(time_step(f64::INFINITY, 50.), 0.02);
    }

    #[test]
    fn waits_for_window() {
        let start = Instant::now();
        let mut estimator = FrameRateEstimator::new(Duration::from_millis(100), start);
        assert_eq!(estimator.sample(3, start + Duration::from_millis(50)), None);
        assert_eq!(estimator.sample(3, start + Duration::from_millis(100)), None);
    }

    #[test]
    fn estimates_rate() {
        let start = Instant::now();
        let mut estimator = FrameRateEstimator::new(Duration::from_millis(100), start);
        let fps = estimator
            .sample(6, start + Duration::from_millis(200))
            .unwrap();
        assert_feq(fps, 30.);
        let fps = estimator
            .sample(10, start + Duration::from_millis(400))
            .unwrap();
        assert_feq(fps, 20.);
    }

    #[test]
    fn no_frames_means_zero_rate() {
        let start = Instant::now();
        let mut estimator = FrameRateEstimator::new(Duration::from_millis(100), start);
        let fps = estimator
            .sample(0, start + Duration::from_millis(150))
            .unwrap();
        assert_feq(fps, 0.);
        assert_feq(time_step(fps, 1000.), 1.);
    }
}
