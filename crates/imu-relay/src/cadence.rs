//! Fixed-period cycle pacing

use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Default cycle period
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(80);

/// Catch-up pacing against a monotonic clock
///
/// A cycle that finishes early sleeps out the rest of the period. A cycle
/// that runs long is followed immediately by the next one; nothing is
/// skipped and nothing is reported beyond a trace event.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    period: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Cadence {
    /// Create a cadence with the given target period
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Target period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left to sleep after a cycle took `elapsed`, if any
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.period
            .checked_sub(elapsed)
            .filter(|left| !left.is_zero())
    }

    /// Sleep until one period after `cycle_start`
    ///
    /// Returns `false` when the cycle overran and no sleep happened.
    pub async fn pace(&self, cycle_start: Instant) -> bool {
        let elapsed = cycle_start.elapsed();
        match self.remaining(elapsed) {
            Some(left) => {
                tokio::time::sleep(left).await;
                true
            }
            None => {
                trace!(?elapsed, period = ?self.period, "Cycle overran cadence");
                false
            }
        }
    }
}
