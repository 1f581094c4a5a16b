//! Read-only projection of the session for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AgeBracket, BreakPolicy, SessionClock, UserProfile, HEALTH_TIP};

/// What the UI renders: a counter and, when visible, the reminder dialog.
///
/// Built by the tracker after every transition; the UI never mutates
/// session state directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub active: bool,
    pub elapsed_ms: u64,
    /// `HH:MM:SS`
    pub elapsed_display: String,
    pub reminder_visible: bool,
    /// Bracket-specific reminder text.
    pub message: String,
    pub bracket: AgeBracket,
    pub threshold_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub last_break_at: Option<DateTime<Utc>>,
    pub health_tip: String,
}

impl SessionView {
    /// Projects the clock through the policy for the given user.
    ///
    /// Without a profile (logged out) the adult bracket is used.
    pub fn project(
        clock: &SessionClock,
        policy: &BreakPolicy,
        profile: Option<&UserProfile>,
        now: DateTime<Utc>,
    ) -> Self {
        let state = clock.state();
        let bracket = BreakPolicy::bracket_for(profile, now);
        let threshold = policy.threshold_for(bracket);
        let elapsed_ms = state.accumulated_ms();

        Self {
            active: state.is_active(),
            elapsed_ms,
            elapsed_display: format_elapsed(elapsed_ms),
            reminder_visible: state.reminder_visible(),
            message: policy.reminder_message(bracket),
            bracket,
            threshold_ms: u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX),
            started_at: state.started_at(),
            last_break_at: state.last_break_at(),
            health_tip: HEALTH_TIP.to_string(),
        }
    }

    /// Fraction of the threshold used so far, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.threshold_ms == 0 {
            return 0.0;
        }
        (self.elapsed_ms as f64 / self.threshold_ms as f64).clamp(0.0, 1.0)
    }

    /// True once the elapsed time has reached the threshold.
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        self.active && self.elapsed_ms >= self.threshold_ms
    }
}

/// Formats milliseconds as `HH:MM:SS`.
///
/// Hours are not wrapped at 24; sessions left running over a weekend show
/// `49:12:03`.
#[must_use]
pub fn format_elapsed(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(999), "00:00:00");
        assert_eq!(format_elapsed(61_000), "00:01:01");
        assert_eq!(format_elapsed(3_723_000), "01:02:03");
        assert_eq!(format_elapsed(177_123_000), "49:12:03");
    }

    #[test]
    fn test_project_inactive() {
        let view = SessionView::project(&SessionClock::new(), &BreakPolicy::default(), None, t0());
        assert!(!view.active);
        assert_eq!(view.elapsed_ms, 0);
        assert_eq!(view.elapsed_display, "00:00:00");
        assert!(!view.reminder_visible);
        assert_eq!(view.bracket, AgeBracket::Adult);
        assert_eq!(view.started_at, None);
        assert_eq!(view.health_tip, HEALTH_TIP);
    }

    #[test]
    fn test_project_child_session() {
        let policy = BreakPolicy::default();
        let profile =
            UserProfile::new("kid").with_date_of_birth(NaiveDate::from_ymd_opt(2016, 2, 1).unwrap());
        let mut clock = SessionClock::new();
        clock.start(t0());
        clock.tick(t0() + chrono::Duration::minutes(30));

        let view = SessionView::project(&clock, &policy, Some(&profile), t0());
        assert!(view.active);
        assert_eq!(view.bracket, AgeBracket::Children);
        assert_eq!(view.threshold_ms, 3_600_000);
        assert_eq!(view.elapsed_display, "00:30:00");
        assert_eq!(view.message, policy.reminder_message(AgeBracket::Children));
        assert!((view.progress() - 0.5).abs() < f64::EPSILON);
        assert!(!view.is_over_limit());
    }

    #[test]
    fn test_progress_clamps() {
        let mut clock = SessionClock::new();
        clock.start(t0());
        clock.tick(t0() + chrono::Duration::hours(10));
        let view = SessionView::project(&clock, &BreakPolicy::default(), None, t0());
        assert!((view.progress() - 1.0).abs() < f64::EPSILON);
        assert!(view.is_over_limit());
    }
}
