//! Tracker actor - owns the session clock and its reminder timer.
//!
//! The actor is the single owner of session state. Commands arrive over an
//! mpsc channel from handles, the tick task, and the reminder timer; events
//! go out over broadcast.
//!
//! # Reminder timer
//!
//! While the gate is armed a one-shot task sleeps until the threshold and
//! then sends `ReminderDue { epoch }`. Every cancel or re-arm bumps the
//! epoch, so an expiry that was already queued when the session was reset
//! or torn down is recognised as stale and dropped.
//!
//! The timer task holds a weak sender: a pending timer never keeps the actor
//! alive after the last handle is gone.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Store failures are logged and tracking continues in memory
//! - Channel send failures are ignored (receivers may have gone away)

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use screentime_core::{
    describe_duration, BreakPolicy, Clock, SessionClock, SessionView, UserProfile,
};

use super::commands::{TrackerCommand, TrackerEvent};
use super::TrackerOptions;
use crate::store::SessionStore;

// ============================================================================
// Tracker Actor
// ============================================================================

/// The tracker actor.
///
/// Tracks at most one user at a time. `profile` is `Some` exactly while a
/// session is active.
pub struct TrackerActor {
    /// Command receiver
    receiver: mpsc::Receiver<TrackerCommand>,

    /// Handed to reminder timer tasks so they can report expiry
    self_sender: mpsc::WeakSender<TrackerCommand>,

    /// Event publisher for the UI
    event_publisher: broadcast::Sender<TrackerEvent>,

    policy: BreakPolicy,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,

    session: SessionClock,
    profile: Option<UserProfile>,

    /// Pending one-shot reminder task, if armed
    reminder_timer: Option<JoinHandle<()>>,

    /// Generation of the current reminder timer
    reminder_epoch: u64,
}

impl TrackerActor {
    /// Creates an idle tracker actor.
    ///
    /// `self_sender` must be a downgraded sender of the channel `receiver`
    /// belongs to.
    pub fn new(
        receiver: mpsc::Receiver<TrackerCommand>,
        self_sender: mpsc::WeakSender<TrackerCommand>,
        event_publisher: broadcast::Sender<TrackerEvent>,
        options: TrackerOptions,
    ) -> Self {
        Self {
            receiver,
            self_sender,
            event_publisher,
            policy: options.policy,
            store: options.store,
            clock: options.clock,
            session: SessionClock::new(),
            profile: None,
            reminder_timer: None,
            reminder_epoch: 0,
        }
    }

    /// Runs the actor event loop until shutdown or until every sender is
    /// dropped. A still-active session is persisted on the way out.
    pub async fn run(mut self) {
        info!("Tracker actor starting");

        loop {
            let Some(cmd) = self.receiver.recv().await else {
                self.persist();
                break;
            };
            if self.handle_command(cmd).is_break() {
                break;
            }
        }

        self.cancel_reminder();
        info!(active = self.session.is_active(), "Tracker actor stopped");
    }

    /// Dispatches a command to the appropriate handler.
    fn handle_command(&mut self, cmd: TrackerCommand) -> ControlFlow<()> {
        match cmd {
            TrackerCommand::Login {
                profile,
                respond_to,
            } => {
                let result = self.handle_login(*profile);
                // Ignore send error - client may have dropped the receiver
                let _ = respond_to.send(result);
            }
            TrackerCommand::Logout { respond_to } => {
                let result = self.handle_logout();
                let _ = respond_to.send(result);
            }
            TrackerCommand::UpdateProfile {
                profile,
                respond_to,
            } => {
                let result = self.handle_update_profile(*profile);
                let _ = respond_to.send(result);
            }
            TrackerCommand::AcknowledgeBreak { respond_to } => {
                let result = self.handle_acknowledge_break();
                let _ = respond_to.send(result);
            }
            TrackerCommand::DeferReminder { respond_to } => {
                let result = self.handle_defer_reminder();
                let _ = respond_to.send(result);
            }
            TrackerCommand::GetView { respond_to } => {
                let result = self.handle_get_view();
                let _ = respond_to.send(result);
            }
            TrackerCommand::Subscribe { respond_to } => {
                let _ = respond_to.send(self.event_publisher.subscribe());
            }
            TrackerCommand::Shutdown { respond_to } => {
                self.cancel_reminder();
                self.persist();
                let _ = respond_to.send(());
                return ControlFlow::Break(());
            }
            TrackerCommand::Tick => self.handle_tick(),
            TrackerCommand::ReminderDue { epoch } => self.handle_reminder_due(epoch),
        }
        ControlFlow::Continue(())
    }

    // ========================================================================
    // Command Handlers
    // ========================================================================

    fn handle_login(&mut self, profile: UserProfile) -> bool {
        if self.session.is_active() {
            let same_user = self
                .profile
                .as_ref()
                .is_some_and(|current| current.user_id == profile.user_id);
            if same_user {
                debug!(user = %profile.user_id, "Login for tracked user ignored");
                return false;
            }
            info!(user = %profile.user_id, "Different user logged in, ending previous session");
            self.end_session();
        }

        let now = self.clock.now();
        let key = profile.session_key();

        let resumed = match self.store.load(&key) {
            Ok(Some(state)) => {
                let restored = SessionClock::rehydrate(state, now);
                if restored.is_active() {
                    self.session = restored;
                    true
                } else {
                    false
                }
            }
            Ok(None) => false,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to load persisted session, starting fresh");
                false
            }
        };
        if !resumed {
            self.session.start(now);
        }
        self.profile = Some(profile);

        let bracket = BreakPolicy::bracket_for(self.profile.as_ref(), now);
        info!(
            key = %key,
            resumed,
            bracket = %bracket,
            threshold = %describe_duration(self.policy.threshold_for(bracket)),
            elapsed_ms = self.session.accumulated_ms(),
            "Session started"
        );

        self.schedule_reminder(now);
        self.persist();
        self.publish(TrackerEvent::Started {
            view: Box::new(self.view(now)),
            resumed,
        });
        true
    }

    fn handle_logout(&mut self) -> bool {
        if !self.session.is_active() {
            debug!("Logout with no active session");
            return false;
        }
        self.end_session();
        true
    }

    fn handle_update_profile(&mut self, profile: UserProfile) -> bool {
        let matches = self
            .profile
            .as_ref()
            .is_some_and(|current| current.user_id == profile.user_id);
        if !matches {
            debug!(user = %profile.user_id, "Profile update for untracked user ignored");
            return false;
        }

        let now = self.clock.now();
        self.profile = Some(profile);
        // New date of birth may mean a new threshold for the pending timer
        self.schedule_reminder(now);
        info!(
            bracket = %BreakPolicy::bracket_for(self.profile.as_ref(), now),
            "Profile updated"
        );
        self.publish(TrackerEvent::ProfileUpdated {
            view: Box::new(self.view(now)),
        });
        true
    }

    fn handle_acknowledge_break(&mut self) -> bool {
        let now = self.clock.now();
        let from_reminder = self.session.state().reminder_visible();
        if !self.session.acknowledge_break(now) {
            debug!("Break ignored: no active session");
            return false;
        }

        info!(from_reminder, "Break taken, screen time reset");
        self.schedule_reminder(now);
        self.persist();
        self.publish(TrackerEvent::BreakTaken {
            view: Box::new(self.view(now)),
            from_reminder,
        });
        true
    }

    fn handle_defer_reminder(&mut self) -> bool {
        if !self.session.defer_reminder() {
            debug!("Defer ignored: no reminder visible");
            return false;
        }

        let now = self.clock.now();
        self.session.tick(now);
        info!(
            elapsed_ms = self.session.accumulated_ms(),
            "Reminder deferred until next break"
        );
        self.persist();
        self.publish(TrackerEvent::ReminderDeferred {
            view: Box::new(self.view(now)),
        });
        true
    }

    fn handle_get_view(&mut self) -> SessionView {
        let now = self.clock.now();
        self.session.tick(now);
        self.view(now)
    }

    fn handle_tick(&mut self) {
        let now = self.clock.now();
        if self.session.tick(now) {
            self.publish(TrackerEvent::Ticked {
                view: Box::new(self.view(now)),
            });
        }
    }

    fn handle_reminder_due(&mut self, epoch: u64) {
        if epoch != self.reminder_epoch || !self.session.is_active() {
            debug!(epoch, current = self.reminder_epoch, "Ignoring stale reminder timer");
            return;
        }
        if let Some(timer) = self.reminder_timer.take() {
            timer.abort();
        }

        let now = self.clock.now();
        self.session.tick(now);
        let threshold = self.current_threshold(now);

        if !BreakPolicy::is_over_limit(self.session.accumulated_ms(), threshold) {
            // Timer fired early (coarse sleep or clock skew)
            self.schedule_reminder(now);
            return;
        }

        if self.session.open_reminder() {
            info!(
                elapsed_ms = self.session.accumulated_ms(),
                threshold = %describe_duration(threshold),
                "Break reminder shown"
            );
            self.persist();
            self.publish(TrackerEvent::ReminderShown {
                view: Box::new(self.view(now)),
            });
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Stops the session, cancels the timer and forgets the persisted state.
    fn end_session(&mut self) {
        self.cancel_reminder();
        self.session.stop();

        if let Some(profile) = self.profile.take() {
            let key = profile.session_key();
            if let Err(e) = self.store.remove(&key) {
                warn!(key = %key, error = %e, "Failed to remove persisted session");
            }
            info!(key = %key, "Session ended");
            self.publish(TrackerEvent::Ended { key });
        }
    }

    /// (Re)arms the one-shot reminder timer for the current period.
    ///
    /// Does nothing unless the session is active and the gate is armed.
    fn schedule_reminder(&mut self, now: DateTime<Utc>) {
        self.cancel_reminder();
        if !self.session.is_active() || !self.session.state().gate().is_armed() {
            return;
        }

        let threshold = self.current_threshold(now);
        let delay = self.session.remaining_until(threshold, now);
        let epoch = self.reminder_epoch;
        let sender = self.self_sender.clone();

        self.reminder_timer = Some(tokio::spawn(reminder_timer(sender, delay, epoch)));
        debug!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            epoch,
            "Reminder timer armed"
        );
    }

    /// Aborts the pending timer and invalidates any expiry already queued.
    fn cancel_reminder(&mut self) {
        if let Some(timer) = self.reminder_timer.take() {
            timer.abort();
        }
        self.reminder_epoch = self.reminder_epoch.wrapping_add(1);
    }

    fn current_threshold(&self, now: DateTime<Utc>) -> Duration {
        let bracket = BreakPolicy::bracket_for(self.profile.as_ref(), now);
        self.policy.threshold_for(bracket)
    }

    fn view(&self, now: DateTime<Utc>) -> SessionView {
        SessionView::project(&self.session, &self.policy, self.profile.as_ref(), now)
    }

    fn persist(&self) {
        let Some(profile) = &self.profile else {
            return;
        };
        let key = profile.session_key();
        if let Err(e) = self.store.save(&key, self.session.state()) {
            warn!(key = %key, error = %e, "Failed to persist session state");
        }
    }

    fn publish(&self, event: TrackerEvent) {
        // No subscribers is fine (e.g. before the UI attaches)
        let _ = self.event_publisher.send(event);
    }
}

impl Drop for TrackerActor {
    fn drop(&mut self) {
        if let Some(timer) = self.reminder_timer.take() {
            timer.abort();
        }
    }
}

/// Body of the one-shot reminder task.
async fn reminder_timer(sender: mpsc::WeakSender<TrackerCommand>, delay: Duration, epoch: u64) {
    tokio::time::sleep(delay).await;
    if let Some(sender) = sender.upgrade() {
        let _ = sender.send(TrackerCommand::ReminderDue { epoch }).await;
    }
}
