//! Reminder gate: the latch behind the "time for a break" dialog.
//!
//! The gate is deliberately separate from the threshold check. Opening it
//! consumes the current period's arm, so once a reminder has been shown it
//! cannot reappear until a new period starts (session start or break
//! taken), no matter how often the threshold is re-evaluated.
//!
//! ```text
//!             open (armed)
//!   Hidden ─────────────────▶ Visible
//!     ▲                          │
//!     │   acknowledge / defer    │
//!     └──────────────────────────┘
//!   close: any ─▶ Hidden (disarmed)
//!   arm:   any ─▶ Hidden (armed)
//! ```

use serde::{Deserialize, Serialize};

/// Whether the break reminder is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    #[default]
    Hidden,
    Visible,
}

/// Single-writer latch controlling reminder visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReminderGate {
    state: GateState,
    /// The current period may still raise a reminder.
    armed: bool,
}

impl ReminderGate {
    /// Creates a hidden, disarmed gate.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == GateState::Visible
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Starts a new period: hidden and able to open once.
    pub fn arm(&mut self) {
        self.state = GateState::Hidden;
        self.armed = true;
    }

    /// `Hidden → Visible`, only while armed. Consumes the arm.
    ///
    /// Returns `false` if the gate was already visible or disarmed.
    pub fn open(&mut self) -> bool {
        if self.state == GateState::Visible || !self.armed {
            return false;
        }
        self.state = GateState::Visible;
        self.armed = false;
        true
    }

    /// `Visible → Hidden` because the user is taking a break.
    ///
    /// The caller resets the session clock, which re-arms the gate.
    pub fn acknowledge(&mut self) -> bool {
        self.hide()
    }

    /// `Visible → Hidden` because the user asked to be reminded later.
    ///
    /// Does not re-arm: the period's reminder has been spent.
    pub fn defer(&mut self) -> bool {
        self.hide()
    }

    /// Unconditionally hides and disarms (session end).
    pub fn close(&mut self) {
        self.state = GateState::Hidden;
        self.armed = false;
    }

    fn hide(&mut self) -> bool {
        if self.state != GateState::Visible {
            return false;
        }
        self.state = GateState::Hidden;
        true
    }
}
