//! Domain-specific error types following panic-free policy.

use crate::AgeBracket;
use thiserror::Error;

/// Errors that can occur while building domain values.
///
/// State transitions never fail; only inputs coming from outside
/// (profile data, configuration) are validated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Date of birth could not be parsed or is not plausible
    #[error("Invalid date of birth {value:?}: {reason}")]
    InvalidDateOfBirth { value: String, reason: String },

    /// Break threshold is not usable for the given bracket
    #[error("Invalid threshold for {bracket}: {reason}")]
    InvalidThreshold { bracket: AgeBracket, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
