//! Clock driven by tokio's monotonic time.

use chrono::{DateTime, Utc};
use screentime_core::Clock;
use tokio::time::Instant;

/// Wall-clock time anchored once, then advanced by tokio's monotonic clock.
///
/// Follows paused/advanced time in tokio tests, which lets hours of session
/// time run in milliseconds. Not for production: monotonic time does not
/// advance while the machine is suspended, so stamps fall behind the wall
/// clock. Trackers default to [`SystemClock`](screentime_core::SystemClock).
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin_wall: DateTime<Utc>,
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Anchors the clock so that "now" reads `wall` at construction time.
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            origin_wall: wall,
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin_wall + elapsed
    }
}
