//! Screen-time tracker using the Actor pattern.
//!
//! The actor owns the session clock and is driven by three sources:
//!
//! ```text
//! ┌──────────────┐ login / break /  ┌────────────────┐   TrackerEvent
//! │TrackerHandle │ defer / view     │  TrackerActor  │──────────────▶ subscribers
//! └──────────────┘─────────────────▶│                │  (broadcast)
//! ┌──────────────┐ Tick             │ SessionClock   │
//! │  tick task   │─────────────────▶│ ReminderGate   │──▶ SessionStore
//! └──────────────┘                  │                │
//! ┌──────────────┐ ReminderDue{ep}  │                │
//! │reminder timer│─────────────────▶│                │
//! └──────────────┘  (one-shot)      └────────────────┘
//! ```
//!
//! The tick only refreshes the displayed counter. The reminder is driven by
//! the one-shot timer, armed for `threshold - elapsed` whenever a period
//! starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use screentime_core::{BreakPolicy, Clock, SystemClock};

use crate::store::SessionStore;

mod actor;
mod commands;
mod handle;

pub use actor::TrackerActor;
pub use commands::{TrackerCommand, TrackerError, TrackerEvent};
pub use handle::TrackerHandle;

/// Channel buffer sizes
const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

/// Default display tick.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Everything the tracker needs besides its channels.
#[derive(Clone)]
pub struct TrackerOptions {
    pub policy: BreakPolicy,
    pub tick_interval: Duration,
    pub store: Arc<dyn SessionStore>,
    pub clock: Arc<dyn Clock>,
}

impl TrackerOptions {
    /// Options with a 1 s tick and the system wall clock.
    pub fn new(policy: BreakPolicy, store: Arc<dyn SessionStore>) -> Self {
        Self {
            policy,
            tick_interval: DEFAULT_TICK_INTERVAL,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Spawn the tracker actor and its tick task, returning a handle.
///
/// The actor stops after [`TrackerHandle::shutdown`] or once every handle
/// is dropped; the tick task follows it.
pub fn spawn_tracker(options: TrackerOptions) -> TrackerHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    let tick_interval = options.tick_interval;
    let actor = TrackerActor::new(cmd_rx, cmd_tx.downgrade(), event_tx, options);
    tokio::spawn(actor.run());

    spawn_tick_task(cmd_tx.downgrade(), tick_interval);

    TrackerHandle::new(cmd_tx)
}

/// Spawn a background task that sends `Tick` every `period`.
///
/// Runs for the life of the actor; ticks with no active session are
/// no-ops on the actor side.
fn spawn_tick_task(sender: mpsc::WeakSender<TrackerCommand>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        // After a suspend, one tick catches up; elapsed time comes from timestamps
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let Some(sender) = sender.upgrade() else {
                debug!("Tick task stopping: all tracker handles dropped");
                break;
            };
            if sender.send(TrackerCommand::Tick).await.is_err() {
                debug!("Tick task stopping: tracker channel closed");
                break;
            }
        }
    });
}
