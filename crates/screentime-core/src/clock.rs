//! Session clock: wall-clock elapsed time for the current login session.
//!
//! Elapsed time is always recomputed as `now - started_at`. Nothing counts
//! tick invocations, so a suspended or throttled process catches up on the
//! next tick instead of drifting.
//!
//! Every operation reports whether it changed anything. Calls that violate a
//! precondition (ticking an inactive clock, resetting before start) are
//! no-ops returning `false`, never errors: the callers are timers and UI
//! events that can legitimately race with teardown.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::session::SessionState;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Owner of a [`SessionState`] and its lifecycle transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionClock {
    state: SessionState,
}

impl SessionClock {
    /// Creates an inactive clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a clock from persisted state.
    ///
    /// Active sessions recompute their elapsed time from `started_at` rather
    /// than trusting the stored value. States that break the invariants
    /// collapse to the torn-down state.
    pub fn rehydrate(state: SessionState, now: DateTime<Utc>) -> Self {
        if !state.is_consistent() {
            debug!("Discarding inconsistent persisted session state");
            return Self::new();
        }
        let mut clock = Self { state };
        clock.tick(now);
        clock
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn accumulated_ms(&self) -> u64 {
        self.state.accumulated_ms
    }

    /// Begins tracking. No-op if a session is already active.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.state.active {
            return false;
        }
        self.state.started_at = Some(now);
        self.state.active = true;
        self.state.accumulated_ms = 0;
        self.state.gate.arm();
        true
    }

    /// Recomputes elapsed time from the start timestamp.
    ///
    /// A wall clock stepping backwards never lowers the accumulated value.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let Some(started_at) = self.state.started_at.filter(|_| self.state.active) else {
            return false;
        };
        let elapsed = millis_between(started_at, now);
        self.state.accumulated_ms = self.state.accumulated_ms.max(elapsed);
        true
    }

    /// Ends the session and returns to the torn-down state. Idempotent.
    ///
    /// Returns `true` if a session was active.
    pub fn stop(&mut self) -> bool {
        let was_active = self.state.active;
        self.state.active = false;
        self.state.started_at = None;
        self.state.accumulated_ms = 0;
        self.state.last_break_at = None;
        self.state.gate.close();
        was_active
    }

    /// Break taken: restarts the period from `now` and re-arms the gate.
    ///
    /// Requires an active session; otherwise a no-op.
    pub fn reset(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.active {
            return false;
        }
        self.state.started_at = Some(now);
        self.state.accumulated_ms = 0;
        self.state.last_break_at = Some(now);
        self.state.gate.arm();
        true
    }

    /// Shows the reminder if the session is active and the period is armed.
    pub fn open_reminder(&mut self) -> bool {
        self.state.active && self.state.gate.open()
    }

    /// "I'll take a break": hides the reminder (if shown) and resets.
    ///
    /// Also used for a manual break while no reminder is visible.
    pub fn acknowledge_break(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.active {
            return false;
        }
        self.state.gate.acknowledge();
        self.reset(now)
    }

    /// "Remind me later": hides the reminder without touching the clock.
    pub fn defer_reminder(&mut self) -> bool {
        self.state.gate.defer()
    }

    /// Elapsed time as of `now`, without mutating the state.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        match self.state.started_at.filter(|_| self.state.active) {
            Some(started_at) => self.state.accumulated_ms.max(millis_between(started_at, now)),
            None => 0,
        }
    }

    /// Time left before `threshold` is reached; zero once reached.
    pub fn remaining_until(&self, threshold: Duration, now: DateTime<Utc>) -> Duration {
        threshold.saturating_sub(Duration::from_millis(self.elapsed_at(now)))
    }
}

fn millis_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}
