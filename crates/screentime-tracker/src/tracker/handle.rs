//! Client interface for interacting with the TrackerActor.
//!
//! Channel errors are mapped to `TrackerError::ChannelClosed`.

use tokio::sync::{broadcast, mpsc, oneshot};

use screentime_core::{SessionView, UserProfile};

use super::commands::{TrackerCommand, TrackerError, TrackerEvent};

// ============================================================================
// Tracker Handle
// ============================================================================

/// Cheap-to-clone handle to the tracker actor.
///
/// ```ignore
/// let handle = spawn_tracker(options);
/// let mut events = handle.subscribe().await?;
///
/// handle.login(UserProfile::from_raw("alice", Some("2011-04-02"))).await?;
/// while let Ok(event) = events.recv().await {
///     if let TrackerEvent::ReminderShown { .. } = event {
///         handle.defer_reminder().await?;
///     }
/// }
/// ```
#[derive(Clone)]
pub struct TrackerHandle {
    /// Command sender to the actor
    sender: mpsc::Sender<TrackerCommand>,
}

impl TrackerHandle {
    pub fn new(sender: mpsc::Sender<TrackerCommand>) -> Self {
        Self { sender }
    }

    /// Starts (or resumes) tracking for `profile`.
    ///
    /// Returns `false` if that user is already being tracked.
    ///
    /// # Errors
    ///
    /// `TrackerError::ChannelClosed` if the actor has shut down.
    pub async fn login(&self, profile: UserProfile) -> Result<bool, TrackerError> {
        self.request(|respond_to| TrackerCommand::Login {
            profile: Box::new(profile),
            respond_to,
        })
        .await
    }

    /// Ends the session. Returns `false` if none was active.
    ///
    /// # Errors
    ///
    /// `TrackerError::ChannelClosed` if the actor has shut down.
    pub async fn logout(&self) -> Result<bool, TrackerError> {
        self.request(|respond_to| TrackerCommand::Logout { respond_to })
            .await
    }

    /// Replaces the tracked user's profile.
    ///
    /// # Errors
    ///
    /// `TrackerError::ChannelClosed` if the actor has shut down.
    pub async fn update_profile(&self, profile: UserProfile) -> Result<bool, TrackerError> {
        self.request(|respond_to| TrackerCommand::UpdateProfile {
            profile: Box::new(profile),
            respond_to,
        })
        .await
    }

    /// Takes a break: resets the counter and hides the reminder.
    ///
    /// Returns `false` if no session is active.
    ///
    /// # Errors
    ///
    /// `TrackerError::ChannelClosed` if the actor has shut down.
    pub async fn acknowledge_break(&self) -> Result<bool, TrackerError> {
        self.request(|respond_to| TrackerCommand::AcknowledgeBreak { respond_to })
            .await
    }

    /// Hides the reminder without resetting. Returns `false` if none was shown.
    ///
    /// # Errors
    ///
    /// `TrackerError::ChannelClosed` if the actor has shut down.
    pub async fn defer_reminder(&self) -> Result<bool, TrackerError> {
        self.request(|respond_to| TrackerCommand::DeferReminder { respond_to })
            .await
    }

    /// Current view, with elapsed time brought up to date.
    ///
    /// # Errors
    ///
    /// `TrackerError::ChannelClosed` if the actor has shut down.
    pub async fn view(&self) -> Result<SessionView, TrackerError> {
        self.request(|respond_to| TrackerCommand::GetView { respond_to })
            .await
    }

    /// Persists the session and stops the actor.
    ///
    /// The session stays saved, so the next login for the same user
    /// resumes it.
    ///
    /// # Errors
    ///
    /// `TrackerError::ChannelClosed` if the actor had already stopped.
    pub async fn shutdown(&self) -> Result<(), TrackerError> {
        self.request(|respond_to| TrackerCommand::Shutdown { respond_to })
            .await
    }

    /// Subscribe to tracker events.
    ///
    /// The receiver reports `Closed` once the actor stops.
    ///
    /// # Errors
    ///
    /// `TrackerError::ChannelClosed` if the actor has shut down.
    pub async fn subscribe(&self) -> Result<broadcast::Receiver<TrackerEvent>, TrackerError> {
        self.request(|respond_to| TrackerCommand::Subscribe { respond_to })
            .await
    }

    /// Whether the actor is still running.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> TrackerCommand,
    ) -> Result<T, TrackerError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(make(tx))
            .await
            .map_err(|_| TrackerError::ChannelClosed)?;

        rx.await.map_err(|_| TrackerError::ChannelClosed)
    }
}
