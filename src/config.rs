use std::{env, time::Duration};

// Scheduling constants for the driver (not physics tuning).

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(30);
pub const DEFAULT_FRAME_RATE_WINDOW: Duration = Duration::from_millis(100);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_MAX_FPS: f64 = 1000.;

#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    pub tick_interval: Duration,
    pub frame_rate_window: Duration,
    pub settle_delay: Duration,
    pub max_fps: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            frame_rate_window: DEFAULT_FRAME_RATE_WINDOW,
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_fps: DEFAULT_MAX_FPS,
        }
    }
}

impl DriverConfig {
    /// Reads `LANDER_TICK_MS`, `LANDER_FPS_WINDOW_MS`, `LANDER_SETTLE_MS` and
    /// `LANDER_MAX_FPS`, keeping the default for anything missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_interval: env_millis("LANDER_TICK_MS")
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.tick_interval),
            frame_rate_window: env_millis("LANDER_FPS_WINDOW_MS")
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.frame_rate_window),
            settle_delay: env_millis("LANDER_SETTLE_MS").unwrap_or(defaults.settle_delay),
            max_fps: env::var("LANDER_MAX_FPS")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 1.)
                .unwrap_or(defaults.max_fps),
        }
    }

    pub fn with_tick_interval(self, tick_interval: Duration) -> Self {
        assert!(!tick_interval.is_zero());
        Self {
            tick_interval,
            ..self
        }
    }

    pub fn with_frame_rate_window(self, frame_rate_window: Duration) -> Self {
        assert!(!frame_rate_window.is_zero());
        Self {
            frame_rate_window,
            ..self
        }
    }

    pub fn with_settle_delay(self, settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            ..self
        }
    }

    pub fn with_max_fps(self, max_fps: f64) -> Self {
        assert!(max_fps >= 1.);
        Self { max_fps, ..self }
    }

    /// Frame rate implied by the tick interval, used before the first estimate.
    pub fn nominal_fps(&self) -> f64 {
        1. / self.tick_interval.as_secs_f64()
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
}
