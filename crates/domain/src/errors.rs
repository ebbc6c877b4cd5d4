//! Domain-level errors

use thiserror::Error;

/// Errors that can occur when validating a chaos specification
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Delay duration must be strictly positive
    #[error("delay duration must be greater than 0")]
    NonPositiveDelayDuration,

    /// Probability outside the `[0, 1]` range
    #[error("probability must be between 0 and 1, got {0}")]
    ProbabilityOutOfRange(f64),

    /// Error status code outside the `[100, 600]` range
    #[error("error status code must be between 100 and 600, got {0}")]
    StatusCodeOutOfRange(u16),

    /// Relative duration string could not be parsed
    #[error("invalid value for duration parameter: {0}")]
    InvalidDuration(String),
}
