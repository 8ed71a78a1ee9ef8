use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tick-indexed simulation clock.
///
/// Keeps two time bases side by side: a tick counter for frame-cadence
/// behaviour (flicker toggling, jump-hold frames) and the accumulated
/// simulated time for behaviour keyed to real seconds (effect lifetimes,
/// invincibility, notifications). Elapsed time is summed as a `Duration` so
/// repeated small steps do not drift the way an `f32` accumulator would.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    tick: u64,
    elapsed: Duration,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick by `dt` seconds. Negative or non-finite steps count
    /// as a tick with zero elapsed time.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += Duration::from_secs_f32(dt);
        }
    }

    /// Number of ticks advanced so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated time since the clock started.
    pub fn now(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

/// Milliseconds covered by `frames` ticks at `tick_rate_hz`.
pub fn frames_to_millis(frames: u32, tick_rate_hz: f32) -> f64 {
    if tick_rate_hz <= 0.0 {
        return 0.0;
    }
    frames as f64 * (1000.0 / tick_rate_hz as f64)
}
