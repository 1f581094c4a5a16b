//! Application state for the screentime TUI.
//!
//! The app never mutates session state itself: it mirrors the latest
//! [`SessionView`] published by the tracker and turns key presses into
//! [`Action`](crate::input::Action)s for the main loop to forward.

use chrono::{DateTime, Utc};
use screentime_core::SessionView;
use screentime_tracker::TrackerEvent;
use tracing::debug;

/// Toast shown after a break is taken.
pub const BREAK_NOTICE: &str = "Break taken! Screen time reset.";

/// Toast shown when an interrupted session is picked up again.
pub const RESUMED_NOTICE: &str = "Welcome back! Your session was resumed.";

/// How long a notice stays up, in UI ticks (100 ms each).
pub const NOTICE_TICKS: u32 = 50;

/// Ticks per blink phase of the over-limit counter.
const BLINK_TICKS: u32 = 5;

// ============================================================================
// Application State
// ============================================================================

/// Where the app stands relative to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Waiting for the first view from the tracker.
    #[default]
    Starting,

    /// A session is being tracked.
    Tracking,

    /// The user logged out; nothing is counted.
    LoggedOut,

    /// The tracker stopped publishing events.
    Disconnected,
}

/// The two buttons of the break reminder dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogButton {
    #[default]
    TakeBreak,
    RemindLater,
}

impl DialogButton {
    pub fn toggle(self) -> Self {
        match self {
            Self::TakeBreak => Self::RemindLater,
            Self::RemindLater => Self::TakeBreak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TakeBreak => "I'll take a break",
            Self::RemindLater => "Remind me later",
        }
    }

    /// Shortcut key shown next to the label.
    pub fn shortcut(self) -> char {
        match self {
            Self::TakeBreak => 'b',
            Self::RemindLater => 'l',
        }
    }
}

/// A transient message shown below the counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    remaining_ticks: u32,
}

impl Notice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            remaining_ticks: NOTICE_TICKS,
        }
    }
}

// ============================================================================
// Application
// ============================================================================

/// Core application state for the screentime TUI.
#[derive(Debug, Clone)]
pub struct App {
    /// User the session belongs to (shown in the header).
    pub user_id: String,

    pub state: AppState,

    /// Latest projection from the tracker.
    pub view: Option<SessionView>,

    /// Focused button while the reminder dialog is open.
    pub focus: DialogButton,

    pub notice: Option<Notice>,

    /// Flag indicating the application should quit.
    pub should_quit: bool,

    /// When the last view arrived.
    pub last_update: DateTime<Utc>,

    /// Blink phase for the over-limit counter.
    pub blink_visible: bool,

    tick_count: u32,
}

impl App {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: AppState::Starting,
            view: None,
            focus: DialogButton::default(),
            notice: None,
            should_quit: false,
            last_update: Utc::now(),
            blink_visible: true,
            tick_count: 0,
        }
    }

    /// Replaces the mirrored view.
    pub fn set_view(&mut self, view: SessionView) {
        let opening = view.reminder_visible && !self.reminder_visible();
        if opening {
            self.focus = DialogButton::default();
        }
        self.state = if view.active {
            AppState::Tracking
        } else {
            AppState::LoggedOut
        };
        self.view = Some(view);
        self.last_update = Utc::now();
    }

    /// Folds a tracker event into the app state.
    pub fn apply_event(&mut self, event: &TrackerEvent) {
        debug!(event = event.kind(), "Tracker event");
        match event {
            TrackerEvent::Started { view, resumed } => {
                self.set_view(view.as_ref().clone());
                if *resumed {
                    self.notice = Some(Notice::new(RESUMED_NOTICE));
                }
            }
            TrackerEvent::BreakTaken { view, .. } => {
                self.set_view(view.as_ref().clone());
                self.notice = Some(Notice::new(BREAK_NOTICE));
            }
            TrackerEvent::Ticked { view }
            | TrackerEvent::ReminderShown { view }
            | TrackerEvent::ReminderDeferred { view }
            | TrackerEvent::ProfileUpdated { view } => {
                self.set_view(view.as_ref().clone());
            }
            TrackerEvent::Ended { .. } => {
                self.view = None;
                self.state = AppState::LoggedOut;
                self.notice = None;
            }
        }
    }

    /// Advances UI timers (notice expiry, blink). Called every 100 ms.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        if self.tick_count % BLINK_TICKS == 0 {
            self.blink_visible = !self.blink_visible;
        }

        if let Some(notice) = &mut self.notice {
            notice.remaining_ticks = notice.remaining_ticks.saturating_sub(1);
            if notice.remaining_ticks == 0 {
                self.notice = None;
            }
        }
    }

    pub fn mark_disconnected(&mut self) {
        self.state = AppState::Disconnected;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn is_tracking(&self) -> bool {
        self.view.as_ref().is_some_and(|v| v.active)
    }

    pub fn reminder_visible(&self) -> bool {
        self.view.as_ref().is_some_and(|v| v.reminder_visible)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggle();
    }
}
