//! screentime core - domain types for screen-time tracking
//!
//! This crate provides the pure domain model shared between the
//! tracker actor (`screentime-tracker`) and the TUI (`screentime-tui`):
//!
//! - [`SessionClock`] owns the elapsed-time state of the current login session
//! - [`BreakPolicy`] maps a date of birth to an age bracket and a threshold
//! - [`ReminderGate`] latches the break reminder between `Hidden` and `Visible`
//! - [`SessionView`] is the read-only projection handed to the UI
//!
//! Nothing here performs I/O or reads the system clock on its own; every
//! time-dependent operation takes `now` as a parameter.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod age;
pub mod clock;
pub mod error;
pub mod gate;
pub mod policy;
pub mod profile;
pub mod session;
pub mod view;

// Re-exports for convenience
pub use age::{age_in_years, AgeBracket};
pub use clock::{Clock, SessionClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use gate::{GateState, ReminderGate};
pub use policy::{describe_duration, BreakPolicy, BreakThresholds, HEALTH_TIP};
pub use profile::{parse_date_of_birth, UserProfile};
pub use session::{SessionKey, SessionState};
pub use view::{format_elapsed, SessionView};
