//! Self-imposed pacing between remote requests.

use std::time::Duration;

use rand::Rng;

/// Randomized delay inserted between consecutive requests to the same server.
///
/// The bounds travel with the value rather than a global random source;
/// tests swap in [`Pacer::disabled`] for instant runs. The delay is a fixed
/// courtesy toward the remote server, not a reaction to any rate-limit
/// signal.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    min: Duration,
    max: Duration,
}

impl Pacer {
    /// Pacer sampling uniformly from `[min, max]`. Swapped bounds are
    /// reordered rather than rejected.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Bounds given in milliseconds.
    pub fn from_millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    /// A pacer that never waits.
    pub fn disabled() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Sample the next delay.
    pub fn delay(&self) -> Duration {
        if self.min == self.max {
            self.min
        } else {
            rand::thread_rng().gen_range(self.min..=self.max)
        }
    }

    /// Sleep for one sampled delay; returns immediately when disabled.
    pub async fn pause(&self) {
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for Pacer {
    /// Half a second to a second, the polite default for public servers.
    fn default() -> Self {
        Self::from_millis(500, 1000)
    }
}
