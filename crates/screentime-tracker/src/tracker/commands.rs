//! Tracker actor commands, errors, and events.
//!
//! - `TrackerCommand`: Commands sent to the actor
//! - `TrackerError`: Errors surfaced to handle callers
//! - `TrackerEvent`: Events published to subscribers (the UI)

use screentime_core::{SessionKey, SessionView, UserProfile};
use thiserror::Error;
use tokio::sync::{broadcast, oneshot};

// ============================================================================
// Tracker Commands
// ============================================================================

/// Commands sent to the tracker actor.
///
/// Request-style commands carry a oneshot `respond_to`; the boolean replies
/// report whether the command changed anything.
#[derive(Debug)]
pub enum TrackerCommand {
    /// A user logged in. Resumes a persisted session or starts a new one.
    ///
    /// Logging in as the user already being tracked is a no-op; logging in
    /// as someone else ends the current session first.
    Login {
        profile: Box<UserProfile>,
        respond_to: oneshot::Sender<bool>,
    },

    /// The user logged out. Tears the session down and forgets it.
    Logout { respond_to: oneshot::Sender<bool> },

    /// Replace the profile of the tracked user (e.g. date of birth changed).
    ///
    /// Ignored unless `profile.user_id` matches the tracked user.
    UpdateProfile {
        profile: Box<UserProfile>,
        respond_to: oneshot::Sender<bool>,
    },

    /// "I'll take a break", or a manual break with no reminder shown.
    AcknowledgeBreak { respond_to: oneshot::Sender<bool> },

    /// "Remind me later". Hides the reminder, keeps counting.
    DeferReminder { respond_to: oneshot::Sender<bool> },

    /// Current projection of the session.
    GetView {
        respond_to: oneshot::Sender<SessionView>,
    },

    /// Register a new event subscriber.
    ///
    /// Only the actor holds the broadcast sender, so subscribers observe
    /// `Closed` once it stops.
    Subscribe {
        respond_to: oneshot::Sender<broadcast::Receiver<TrackerEvent>>,
    },

    /// Persist and stop the actor. Used on application exit.
    Shutdown { respond_to: oneshot::Sender<()> },

    /// Periodic display tick, sent by the tick task.
    Tick,

    /// The one-shot reminder timer expired.
    ///
    /// Carries the epoch it was armed under; an expiry from a timer that has
    /// since been cancelled or re-armed is ignored.
    ReminderDue { epoch: u64 },
}

// ============================================================================
// Tracker Errors
// ============================================================================

/// Errors from [`TrackerHandle`](super::TrackerHandle) calls.
///
/// Domain preconditions (break with no session, defer with nothing shown)
/// are reported as `false` replies, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The actor has shut down.
    #[error("tracker channel closed")]
    ChannelClosed,
}

// ============================================================================
// Tracker Events
// ============================================================================

/// Events published by the tracker to subscribers.
///
/// Views are boxed to keep the enum small.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// A session began tracking.
    Started {
        view: Box<SessionView>,
        /// True if an interrupted session was restored from the store.
        resumed: bool,
    },

    /// Elapsed time advanced.
    Ticked { view: Box<SessionView> },

    /// The break reminder became visible.
    ReminderShown { view: Box<SessionView> },

    /// The reminder was dismissed with "Remind me later".
    ReminderDeferred { view: Box<SessionView> },

    /// A break was taken and the period restarted.
    BreakTaken {
        view: Box<SessionView>,
        /// False for a manual break with no reminder on screen.
        from_reminder: bool,
    },

    /// The session was torn down (logout or user switch).
    Ended { key: SessionKey },

    /// The tracked user's profile changed.
    ProfileUpdated { view: Box<SessionView> },
}

impl TrackerEvent {
    /// The view carried by the event, if any.
    pub fn view(&self) -> Option<&SessionView> {
        match self {
            Self::Started { view, .. }
            | Self::Ticked { view }
            | Self::ReminderShown { view }
            | Self::ReminderDeferred { view }
            | Self::BreakTaken { view, .. }
            | Self::ProfileUpdated { view } => Some(view),
            Self::Ended { .. } => None,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Ticked { .. } => "ticked",
            Self::ReminderShown { .. } => "reminder_shown",
            Self::ReminderDeferred { .. } => "reminder_deferred",
            Self::BreakTaken { .. } => "break_taken",
            Self::Ended { .. } => "ended",
            Self::ProfileUpdated { .. } => "profile_updated",
        }
    }
}
