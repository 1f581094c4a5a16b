//! screentime TUI - library modules
//!
//! Terminal front end for the screen-time tracker.
//!
//! # Architecture
//!
//! The TUI uses an event-driven architecture with three main components:
//!
//! 1. **Keyboard Task**: polls crossterm for key presses and forwards them
//! 2. **Tracker Forwarder**: relays [`TrackerEvent`](screentime_tracker::TrackerEvent)s
//!    from the tracker's broadcast channel
//! 3. **Main Event Loop**: folds events into [`App`], turns keys into
//!    tracker calls, and renders
//!
//! All tasks respect a shared `CancellationToken` for graceful shutdown.

pub mod app;
pub mod error;
pub mod input;
pub mod tasks;
pub mod ui;

// Re-export commonly used types
pub use app::App;
pub use error::{Result, TuiError};
