//! The slice of the authenticated user the tracker reads.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DomainError, DomainResult};
use crate::SessionKey;

/// Read-only view of the logged-in user.
///
/// Only the date of birth influences tracking; `user_id` names the session
/// under which state is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl UserProfile {
    /// Creates a profile without a date of birth (adult bracket).
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            date_of_birth: None,
        }
    }

    #[must_use]
    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }

    /// Builds a profile from an unvalidated date-of-birth string.
    ///
    /// A value that does not parse is dropped with a warning; tracking
    /// then proceeds in the adult bracket instead of failing.
    pub fn from_raw(user_id: impl Into<String>, raw_date_of_birth: Option<&str>) -> Self {
        let user_id = user_id.into();
        let date_of_birth = raw_date_of_birth.and_then(|raw| match parse_date_of_birth(raw) {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(user = %user_id, error = %e, "Ignoring date of birth");
                None
            }
        });
        Self {
            user_id,
            date_of_birth,
        }
    }

    /// Session identity used as the persistence key.
    pub fn session_key(&self) -> SessionKey {
        SessionKey::for_user(&self.user_id)
    }
}

/// Parses a date of birth.
///
/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp such as
/// `2011-04-02T00:00:00.000Z` (how document stores usually serialize dates).
///
/// # Errors
///
/// Returns `DomainError::InvalidDateOfBirth` if neither format matches.
pub fn parse_date_of_birth(raw: &str) -> DomainResult<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|ts| ts.date_naive())
        .map_err(|_| DomainError::InvalidDateOfBirth {
            value: raw.to_string(),
            reason: "expected YYYY-MM-DD or an RFC 3339 timestamp".to_string(),
        })
}
