//! Chaos specification value objects
//!
//! A [`ChaosSpec`] describes what to do to requests matching one route:
//! optionally stall them ([`DelaySpec`]), optionally abort them with an
//! arbitrary status code ([`ErrorSpec`]), optionally only until a fixed
//! point in time. Field constraints are enforced at construction and
//! re-checked by [`ChaosSpec::validate`] before any store mutation.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::DomainError;

fn validate_probability(p: f64) -> Result<(), DomainError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(DomainError::ProbabilityOutOfRange(p))
    }
}

/// Artificial delay: stall a matching request for `duration` with the
/// given probability before letting it proceed.
#[derive(Debug, Clone, PartialEq)]
pub struct DelaySpec {
    /// How long to stall the request
    pub duration: Duration,
    /// Probability of the delay firing, in `[0, 1]`
    pub probability: f64,
}

impl DelaySpec {
    /// Build a validated delay from a millisecond count.
    pub fn new(duration_millis: i64, probability: f64) -> Result<Self, DomainError> {
        let millis =
            u64::try_from(duration_millis).map_err(|_| DomainError::NonPositiveDelayDuration)?;
        let spec = Self {
            duration: Duration::from_millis(millis),
            probability,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the field constraints: strictly positive duration,
    /// probability in `[0, 1]`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.duration.is_zero() {
            return Err(DomainError::NonPositiveDelayDuration);
        }
        validate_probability(self.probability)
    }
}

impl fmt::Display for DelaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (probability: {:.1})",
            humantime::format_duration(self.duration),
            self.probability
        )
    }
}

/// Artificial error: abort a matching request with `status_code` and
/// `message` as the response body, with the given probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSpec {
    /// Status code returned instead of forwarding, in `[100, 600]`
    pub status_code: u16,
    /// Response body (may be empty)
    pub message: String,
    /// Probability of the error firing, in `[0, 1]`
    pub probability: f64,
}

impl ErrorSpec {
    /// Build a validated error spec.
    pub fn new(
        status_code: u16,
        message: impl Into<String>,
        probability: f64,
    ) -> Result<Self, DomainError> {
        let spec = Self {
            status_code,
            message: message.into(),
            probability,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the field constraints: status code in `[100, 600]`,
    /// probability in `[0, 1]`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(100..=600).contains(&self.status_code) {
            return Err(DomainError::StatusCodeOutOfRange(self.status_code));
        }
        validate_probability(self.probability)
    }
}

impl fmt::Display for ErrorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} (probability: {:.1})",
            self.status_code, self.message, self.probability
        )
    }
}

/// The full chaos specification stored for one route key.
///
/// An empty spec (no delay, no error) is legal and simply never
/// triggers anything. `until`, when set, is an absolute instant fixed
/// at write time; it is compared against wall-clock time at decision
/// time and never causes eviction from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChaosSpec {
    /// Optional artificial delay
    pub delay: Option<DelaySpec>,
    /// Optional artificial error
    pub error: Option<ErrorSpec>,
    /// Optional expiry instant, after which the spec is inert
    pub until: Option<DateTime<Utc>>,
}

impl ChaosSpec {
    /// Assemble a spec from its parts.
    #[must_use]
    pub const fn new(
        delay: Option<DelaySpec>,
        error: Option<ErrorSpec>,
        until: Option<DateTime<Utc>>,
    ) -> Self {
        Self { delay, error, until }
    }

    /// Check every present effect against its own field constraints.
    /// The first violation is reported.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(delay) = &self.delay {
            delay.validate()?;
        }
        if let Some(error) = &self.error {
            error.validate()?;
        }
        Ok(())
    }

    /// Whether the spec has logically expired at `now`.
    ///
    /// An expired spec stays stored and overwritable; it just stops
    /// being applied.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.until.is_some_and(|until| now >= until)
    }

    /// A spec with no effects configured never triggers anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.delay.is_none() && self.error.is_none()
    }

    /// Parse a relative duration string (e.g. `"3s"`, `"2m 30s"`) into
    /// the absolute expiry instant `now + duration`.
    pub fn until_from_str(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, DomainError> {
        let duration =
            humantime::parse_duration(s).map_err(|e| DomainError::InvalidDuration(e.to_string()))?;
        let duration = chrono::Duration::from_std(duration)
            .map_err(|e| DomainError::InvalidDuration(e.to_string()))?;
        now.checked_add_signed(duration)
            .ok_or_else(|| DomainError::InvalidDuration(format!("duration out of range: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_spec_valid() {
        let delay = DelaySpec::new(3000, 0.5).expect("valid delay");
        assert_eq!(delay.duration, Duration::from_millis(3000));
        assert!((delay.probability - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn delay_spec_rejects_zero_duration() {
        assert_eq!(
            DelaySpec::new(0, 1.0),
            Err(DomainError::NonPositiveDelayDuration)
        );
    }

    #[test]
    fn delay_spec_rejects_negative_duration() {
        assert_eq!(
            DelaySpec::new(-100, 1.0),
            Err(DomainError::NonPositiveDelayDuration)
        );
    }

    #[test]
    fn delay_spec_rejects_probability_out_of_range() {
        assert!(matches!(
            DelaySpec::new(100, 1.1),
            Err(DomainError::ProbabilityOutOfRange(_))
        ));
        assert!(matches!(
            DelaySpec::new(100, -0.1),
            Err(DomainError::ProbabilityOutOfRange(_))
        ));
    }

    #[test]
    fn delay_spec_accepts_probability_bounds() {
        assert!(DelaySpec::new(100, 0.0).is_ok());
        assert!(DelaySpec::new(100, 1.0).is_ok());
    }

    #[test]
    fn delay_spec_display() {
        let delay = DelaySpec::new(3000, 1.0).expect("valid delay");
        assert_eq!(delay.to_string(), "3s (probability: 1.0)");
    }

    #[test]
    fn error_spec_valid() {
        let error = ErrorSpec::new(504, "Whoopsie", 1.0).expect("valid error");
        assert_eq!(error.status_code, 504);
        assert_eq!(error.message, "Whoopsie");
    }

    #[test]
    fn error_spec_rejects_status_out_of_range() {
        assert_eq!(
            ErrorSpec::new(99, "", 1.0),
            Err(DomainError::StatusCodeOutOfRange(99))
        );
        assert_eq!(
            ErrorSpec::new(601, "", 1.0),
            Err(DomainError::StatusCodeOutOfRange(601))
        );
    }

    #[test]
    fn error_spec_accepts_status_bounds() {
        assert!(ErrorSpec::new(100, "", 0.5).is_ok());
        assert!(ErrorSpec::new(600, "", 0.5).is_ok());
    }

    #[test]
    fn error_spec_allows_empty_message() {
        let error = ErrorSpec::new(429, "", 0.1).expect("valid error");
        assert!(error.message.is_empty());
    }

    #[test]
    fn error_spec_display() {
        let error = ErrorSpec::new(599, "oh noes", 0.1).expect("valid error");
        assert_eq!(error.to_string(), "599 \"oh noes\" (probability: 0.1)");
    }

    #[test]
    fn empty_spec_is_legal_and_valid() {
        let spec = ChaosSpec::default();
        assert!(spec.is_empty());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn validate_reports_first_violation() {
        let spec = ChaosSpec {
            delay: Some(DelaySpec {
                duration: Duration::ZERO,
                probability: 2.0,
            }),
            error: Some(ErrorSpec {
                status_code: 0,
                message: String::new(),
                probability: 1.0,
            }),
            until: None,
        };
        assert_eq!(spec.validate(), Err(DomainError::NonPositiveDelayDuration));
    }

    #[test]
    fn expiry_gate() {
        let now = Utc::now();
        let spec = ChaosSpec {
            until: Some(now + chrono::Duration::seconds(3)),
            ..ChaosSpec::default()
        };
        assert!(!spec.is_expired_at(now));
        assert!(spec.is_expired_at(now + chrono::Duration::seconds(3)));
        assert!(spec.is_expired_at(now + chrono::Duration::seconds(5)));
    }

    #[test]
    fn no_until_never_expires() {
        let spec = ChaosSpec::default();
        assert!(!spec.is_expired_at(Utc::now() + chrono::Duration::days(365)));
    }

    #[test]
    fn until_from_str_parses_relative_duration() {
        let now = Utc::now();
        let until = ChaosSpec::until_from_str("3s", now).expect("valid duration");
        assert_eq!(until, now + chrono::Duration::seconds(3));
    }

    #[test]
    fn until_from_str_rejects_garbage() {
        assert!(matches!(
            ChaosSpec::until_from_str("not-a-duration", Utc::now()),
            Err(DomainError::InvalidDuration(_))
        ));
    }

    #[test]
    fn until_from_str_rejects_overflowing_duration() {
        // Parses fine as a std duration but lands beyond the
        // representable calendar range; must come back as a
        // validation error, not a panic.
        assert!(matches!(
            ChaosSpec::until_from_str("100000000years", Utc::now()),
            Err(DomainError::InvalidDuration(_))
        ));
    }

    #[test]
    fn until_from_str_rejects_negative() {
        assert!(matches!(
            ChaosSpec::until_from_str("-3s", Utc::now()),
            Err(DomainError::InvalidDuration(_))
        ));
    }
}
