//! Age brackets and calendar-correct age computation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Age group that selects a break threshold and reminder wording.
///
/// | Age (years)          | Bracket    |
/// |----------------------|------------|
/// | < 13                 | `Children` |
/// | 13..=17              | `Teenage`  |
/// | >= 18 or unknown DOB | `Adult`    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    /// Under 13 years old.
    Children,

    /// 13 to 17 years old.
    Teenage,

    /// 18 or older, and the fallback when no usable date of birth exists.
    #[default]
    Adult,
}

impl AgeBracket {
    /// Youngest age that counts as teenage.
    pub const TEENAGE_FROM: i32 = 13;

    /// Youngest age that counts as adult.
    pub const ADULT_FROM: i32 = 18;

    /// All brackets, youngest first.
    pub const ALL: [AgeBracket; 3] = [Self::Children, Self::Teenage, Self::Adult];

    /// Maps an age in whole years to its bracket.
    ///
    /// Negative ages (a birth date in the future) have no meaningful
    /// bracket and fall back to `Adult`.
    #[must_use]
    pub fn from_age(age: i32) -> Self {
        if age < 0 {
            Self::Adult
        } else if age < Self::TEENAGE_FROM {
            Self::Children
        } else if age < Self::ADULT_FROM {
            Self::Teenage
        } else {
            Self::Adult
        }
    }

    /// Returns the lowercase label used in logs and config.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Children => "children",
            Self::Teenage => "teenage",
            Self::Adult => "adult",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Computes age in whole years on `today`.
///
/// The year difference is decremented by one when `today`'s month/day
/// precedes the birth month/day, so a birthday only counts once it has
/// actually happened this year. Someone born on 29 February turns a year
/// older on 1 March in non-leap years.
#[must_use]
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}
