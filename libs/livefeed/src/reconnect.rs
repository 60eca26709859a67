//! Reconnect policies for the live feed connection.
//!
//! The source behavior of the dashboard this replaces was "connect once,
//! stay dead after the first drop". That is still expressible
//! (`NoReconnect`), but the default is a capped exponential backoff so a
//! long-running dashboard survives publisher restarts.

use std::time::Duration;

/// Decides whether and when to reattempt a dropped connection.
///
/// `attempt` is 0-indexed and counts failures since the last successful
/// connection; the client resets it once a connection is established.
pub trait ReconnectPolicy: Send + Sync {
    /// `Some(delay)` to wait before the next attempt, `None` to give up.
    fn delay_before(&self, attempt: usize) -> Option<Duration>;
}

/// Delays grow as initial * 2^attempt, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl ReconnectPolicy for ExponentialBackoff {
    fn delay_before(&self, attempt: usize) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return None;
            }
        }
        let factor = 2u64.saturating_pow(attempt.min(32) as u32);
        let millis = (self.initial_delay.as_millis() as u64)
            .saturating_mul(factor)
            .min(self.max_delay.as_millis() as u64);
        Some(Duration::from_millis(millis))
    }
}

/// Same delay between every attempt.
#[derive(Debug, Clone)]
pub struct FixedDelay {
    pub delay: Duration,
    pub max_attempts: Option<usize>,
}

impl FixedDelay {
    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self { delay, max_attempts }
    }
}

impl ReconnectPolicy for FixedDelay {
    fn delay_before(&self, attempt: usize) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt >= max => None,
            _ => Some(self.delay),
        }
    }
}

/// Never reconnect; the feed stays down after the first drop.
#[derive(Debug, Clone)]
pub struct NoReconnect;

impl ReconnectPolicy for NoReconnect {
    fn delay_before(&self, _attempt: usize) -> Option<Duration> {
        None
    }
}
