//! Break policy: thresholds per age bracket and reminder wording.
//!
//! Everything here is a pure function of its inputs. The current time is
//! always passed in, never read, so the policy can be tested without
//! touching the system clock.

use chrono::{DateTime, NaiveDate, Utc};
use std::time::Duration;

use crate::age::{age_in_years, AgeBracket};
use crate::error::{DomainError, DomainResult};
use crate::UserProfile;

/// Advice shown under every break reminder.
pub const HEALTH_TIP: &str = "Taking regular breaks helps reduce eye strain and improves focus. \
Try the 20-20-20 rule: Every 20 minutes, look at something 20 feet away for 20 seconds.";

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;

// ============================================================================
// Thresholds
// ============================================================================

/// Accumulated screen time after which each bracket gets a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakThresholds {
    children: Duration,
    teenage: Duration,
    adult: Duration,
}

impl BreakThresholds {
    /// Creates a threshold table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidThreshold` for any zero duration: a zero
    /// threshold would raise the reminder the instant a session starts.
    pub fn new(children: Duration, teenage: Duration, adult: Duration) -> DomainResult<Self> {
        for (bracket, value) in [
            (AgeBracket::Children, children),
            (AgeBracket::Teenage, teenage),
            (AgeBracket::Adult, adult),
        ] {
            if value.is_zero() {
                return Err(DomainError::InvalidThreshold {
                    bracket,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(Self {
            children,
            teenage,
            adult,
        })
    }

    /// Returns the threshold for a bracket.
    #[must_use]
    pub fn for_bracket(&self, bracket: AgeBracket) -> Duration {
        match bracket {
            AgeBracket::Children => self.children,
            AgeBracket::Teenage => self.teenage,
            AgeBracket::Adult => self.adult,
        }
    }
}

impl Default for BreakThresholds {
    /// 1 hour for children, 3 hours for teenagers, 6 hours for adults.
    fn default() -> Self {
        Self {
            children: Duration::from_secs(SECS_PER_HOUR),
            teenage: Duration::from_secs(3 * SECS_PER_HOUR),
            adult: Duration::from_secs(6 * SECS_PER_HOUR),
        }
    }
}

// ============================================================================
// Break Policy
// ============================================================================

/// Decides which threshold applies to a user and when it is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BreakPolicy {
    thresholds: BreakThresholds,
}

impl BreakPolicy {
    pub fn new(thresholds: BreakThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &BreakThresholds {
        &self.thresholds
    }

    /// Derives the age bracket for a date of birth on the UTC date of `now`.
    ///
    /// Absent dates and dates after `now` map to `Adult`.
    #[must_use]
    pub fn age_bracket_of(date_of_birth: Option<NaiveDate>, now: DateTime<Utc>) -> AgeBracket {
        let today = now.date_naive();
        match date_of_birth {
            Some(dob) if dob <= today => AgeBracket::from_age(age_in_years(dob, today)),
            _ => AgeBracket::Adult,
        }
    }

    /// Bracket for a (possibly absent) logged-in user.
    #[must_use]
    pub fn bracket_for(profile: Option<&UserProfile>, now: DateTime<Utc>) -> AgeBracket {
        Self::age_bracket_of(profile.and_then(|p| p.date_of_birth), now)
    }

    #[must_use]
    pub fn threshold_for(&self, bracket: AgeBracket) -> Duration {
        self.thresholds.for_bracket(bracket)
    }

    /// True once the accumulated time has reached the threshold (inclusive).
    #[must_use]
    pub fn is_over_limit(accumulated_ms: u64, threshold: Duration) -> bool {
        u128::from(accumulated_ms) >= threshold.as_millis()
    }

    /// Reminder text for a bracket, naming the configured threshold.
    #[must_use]
    pub fn reminder_message(&self, bracket: AgeBracket) -> String {
        let limit = describe_duration(self.threshold_for(bracket));
        match bracket {
            AgeBracket::Children => format!(
                "You've been using the screen for {limit}. Time to take a break and rest your eyes!"
            ),
            AgeBracket::Teenage => format!(
                "You've been using the screen for {limit}. Consider taking a short break to reduce eye strain."
            ),
            AgeBracket::Adult => format!(
                "You've been using the screen for {limit}. A short break would be beneficial for your eyes and health."
            ),
        }
    }
}

/// Renders a threshold in words: "1 hour", "3 hours", "90 minutes", "45 seconds".
///
/// Whole hours are named in hours; anything else that is a whole number of
/// minutes is named in minutes.
#[must_use]
pub fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (count, unit) = if secs >= SECS_PER_HOUR && secs % SECS_PER_HOUR == 0 {
        (secs / SECS_PER_HOUR, "hour")
    } else if secs >= SECS_PER_MINUTE && secs % SECS_PER_MINUTE == 0 {
        (secs / SECS_PER_MINUTE, "minute")
    } else {
        (secs, "second")
    };
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
