//! Heartbeat logging for quiet feeds

use std::time::{Duration, Instant};

/// Tracks when a periodic "still alive" log line is due. The live feed can
/// legitimately be silent for long stretches; the heartbeat distinguishes
/// quiet from dead.
pub struct Heartbeat {
    interval: Duration,
    last_beat: Instant,
}

impl Heartbeat {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            last_beat: Instant::now(),
        }
    }

    /// True when enough time has passed since the last beat.
    pub fn should_beat(&self) -> bool {
        self.last_beat.elapsed() >= self.interval
    }

    /// Record a beat at the current time.
    pub fn beat(&mut self) {
        self.last_beat = Instant::now();
    }

    /// Restart the quiet-period timer, e.g. after real activity.
    pub fn reset(&mut self) {
        self.beat();
    }
}
