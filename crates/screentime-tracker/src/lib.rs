//! screentime tracker - session owner, timers and persistence
//!
//! This crate runs the screen-time tracker for one logged-in user:
//! - `tracker` - Tracker actor owning the [`SessionClock`] plus its two timers
//! - `store` - Persistence of session state across restarts
//! - `config` - TOML configuration (thresholds, tick interval, state dir)
//! - `clock` - Clock implementations beyond the system clock
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  TrackerCommand   ┌─────────────────┐  TrackerEvent
//! │ TrackerHandle │──────────────────▶│  TrackerActor   │──────────────▶ UI
//! │ (login, break │   (mpsc channel)  │ (session owner) │  (broadcast)
//! │  defer, ...)  │                   └───┬─────────┬───┘
//! └───────────────┘                       │         │
//!        ▲                                ▼         ▼
//!        │ Tick (1 Hz)            reminder timer   SessionStore
//!   tick task                     (one-shot, epoch) (JSON files)
//! ```
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - Channel operations handle closure gracefully
//!
//! [`SessionClock`]: screentime_core::SessionClock

pub mod clock;
pub mod config;
pub mod store;
pub mod tracker;

pub use clock::MonotonicClock;
pub use config::{ConfigError, ThresholdsConfig, TrackerConfig};
pub use store::{FileStore, MemoryStore, SessionStore, StoreError, StoreResult};
pub use tracker::{spawn_tracker, TrackerError, TrackerEvent, TrackerHandle, TrackerOptions};
