//! Background tasks feeding the main loop.
//!
//! 1. **Keyboard task**: polls crossterm for key and resize events
//! 2. **Tracker forwarder**: relays tracker broadcasts into the event channel
//!
//! Both stop when the shared `CancellationToken` is cancelled or the event
//! channel closes.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent};
use screentime_tracker::TrackerEvent;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::input::Event;

/// Poll timeout for crossterm; bounds how long cancellation can go unseen.
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Spawns the keyboard polling task.
///
/// crossterm's poll is synchronous, so each poll runs on the blocking pool.
pub fn spawn_keyboard_task(
    event_tx: mpsc::UnboundedSender<Event>,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if cancel_token.is_cancelled() {
                debug!("Keyboard task shutting down");
                break;
            }

            let poll_result = tokio::task::spawn_blocking(|| {
                if event::poll(KEY_POLL_INTERVAL).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await;

            let forwarded = match poll_result {
                Ok(Some(CrosstermEvent::Key(key))) => event_tx.send(Event::Key(key)),
                Ok(Some(CrosstermEvent::Resize(width, height))) => {
                    event_tx.send(Event::Resize(width, height))
                }
                // Mouse, paste, focus
                Ok(Some(_)) | Ok(None) => Ok(()),
                Err(e) => {
                    error!(error = %e, "Keyboard polling task panicked");
                    break;
                }
            };

            if forwarded.is_err() {
                debug!("Event channel closed, keyboard task exiting");
                break;
            }
        }
    })
}

/// Spawns a task relaying tracker events to the main loop.
///
/// A lagging receiver skips the missed events: every event carries a full
/// view, so the next one brings the UI up to date.
pub fn spawn_tracker_forwarder(
    mut events: broadcast::Receiver<TrackerEvent>,
    event_tx: mpsc::UnboundedSender<Event>,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                () = cancel_token.cancelled() => {
                    debug!("Tracker forwarder shutting down");
                    break;
                }
                received = events.recv() => received,
            };

            match received {
                Ok(tracker_event) => {
                    if event_tx.send(Event::Tracker(Box::new(tracker_event))).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "UI fell behind tracker events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    let _ = event_tx.send(Event::TrackerClosed);
                    break;
                }
            }
        }
    })
}
