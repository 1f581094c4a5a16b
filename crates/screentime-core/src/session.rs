//! Session identity and the tracked session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::ReminderGate;

// ============================================================================
// Type-Safe Identifiers
// ============================================================================

/// Identity under which a tracking session is persisted.
///
/// Derived from the logged-in user, so the same user resuming after a
/// restart picks up their running session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn for_user(user_id: &str) -> Self {
        Self(user_id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe form of the key, one-to-one with the key itself.
    ///
    /// ASCII alphanumerics and `-` are kept. Every other byte of the UTF-8
    /// encoding, `_` included, becomes `_` plus two lowercase hex digits, so
    /// `"a.b"` and `"a_b"` map to `a_2eb` and `a_5fb`. The empty key maps to
    /// a lone `"_"`, which no other key produces.
    #[must_use]
    pub fn file_stem(&self) -> String {
        if self.0.is_empty() {
            return "_".to_string();
        }
        let mut stem = String::with_capacity(self.0.len());
        for byte in self.0.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                stem.push(char::from(byte));
            } else {
                stem.push_str(&format!("_{byte:02x}"));
            }
        }
        stem
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Elapsed-time state of the current login session.
///
/// Fields are only mutated through [`crate::SessionClock`], which upholds:
/// - `active` implies `started_at` is set
/// - inactive implies `accumulated_ms == 0` and a hidden gate
/// - a visible reminder implies `active`
///
/// Serialized (camelCase JSON) for persistence across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) accumulated_ms: u64,
    pub(crate) active: bool,
    pub(crate) last_break_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) gate: ReminderGate,
}

impl SessionState {
    /// The torn-down state: inactive, zeroed, reminder hidden.
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn accumulated_ms(&self) -> u64 {
        self.accumulated_ms
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_break_at(&self) -> Option<DateTime<Utc>> {
        self.last_break_at
    }

    pub fn gate(&self) -> &ReminderGate {
        &self.gate
    }

    pub fn reminder_visible(&self) -> bool {
        self.gate.is_visible()
    }

    /// Checks the state invariants.
    ///
    /// Used when loading persisted state that may have been edited or
    /// written by an older build.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.active {
            self.started_at.is_some()
        } else {
            self.accumulated_ms == 0 && !self.gate.is_visible()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_key_file_stem() {
        assert_eq!(SessionKey::new("alice").file_stem(), "alice");
        assert_eq!(SessionKey::new("user-01").file_stem(), "user-01");
        assert_eq!(SessionKey::new("a.b/c d").file_stem(), "a_2eb_2fc_20d");
        assert_eq!(SessionKey::new("a_b").file_stem(), "a_5fb");
        assert_eq!(SessionKey::new("é").file_stem(), "_c3_a9");
        assert_eq!(SessionKey::new("").file_stem(), "_");
    }

    #[test]
    fn test_file_stem_distinguishes_similar_keys() {
        let keys = ["a.b", "a b", "a/b", "a_b", "a_2eb", "", "_"];
        let stems: std::collections::HashSet<String> =
            keys.iter().map(|k| SessionKey::new(*k).file_stem()).collect();
        assert_eq!(stems.len(), keys.len());
    }

    #[test]
    fn test_inactive_state_is_consistent() {
        let state = SessionState::inactive();
        assert!(!state.is_active());
        assert_eq!(state.accumulated_ms(), 0);
        assert!(!state.reminder_visible());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_inconsistent_states_detected() {
        let active_without_start = SessionState {
            active: true,
            ..SessionState::default()
        };
        assert!(!active_without_start.is_consistent());

        let inactive_with_time = SessionState {
            accumulated_ms: 5,
            ..SessionState::default()
        };
        assert!(!inactive_with_time.is_consistent());
    }

    #[test]
    fn test_state_json_shape() {
        let started = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let state = SessionState {
            started_at: Some(started),
            accumulated_ms: 1500,
            active: true,
            last_break_at: None,
            gate: ReminderGate::default(),
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["startedAt"], "2024-01-15T10:00:00Z");
        assert_eq!(value["accumulatedMs"], 1500);
        assert_eq!(value["active"], true);
        assert!(value["lastBreakAt"].is_null());
        assert_eq!(value["gate"]["state"], "hidden");

        let parsed: SessionState = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_state_without_gate_field_loads() {
        let json = r#"{"startedAt":null,"accumulatedMs":0,"active":false,"lastBreakAt":null}"#;
        let state: SessionState = serde_json::from_str(json).unwrap();
        assert_eq!(state, SessionState::inactive());
    }
}
