//! Injection decision engine
//!
//! Pure decision logic: given a stored spec and the current wall-clock
//! time, decide which effects apply to a single request. Delay and
//! error are judged by independent uniform draws; both may hit on the
//! same request, in which case the delay is applied first and the
//! error then replaces the downstream response.

use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::ChaosSpec;
use rand::Rng;

/// A delay that fired for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayHit {
    /// Configured stall duration
    pub duration: Duration,
    /// Configured probability, echoed for response annotation
    pub probability: f64,
}

/// An error that fired for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorHit {
    /// Status code to return instead of forwarding
    pub status_code: u16,
    /// Response body
    pub message: String,
    /// Configured probability, echoed for response annotation
    pub probability: f64,
}

/// The effects to apply to one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionDecision {
    /// Stall the request before anything else, if set
    pub delay: Option<DelayHit>,
    /// Short-circuit the pipeline with this response, if set
    pub error: Option<ErrorHit>,
}

impl InjectionDecision {
    /// Whether nothing fired and the request passes through unchanged.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.delay.is_none() && self.error.is_none()
    }
}

/// One independent uniform draw per effect, with the tie-break
/// `r > 1 - p` for `r` in `[0, 1)`. A probability of 1.0 always hits
/// and 0.0 never hits; the fast paths keep those cases deterministic.
///
/// The generator is thread-local, so concurrent decisions never share
/// unsynchronized state.
fn hits(probability: f64) -> bool {
    if probability <= 0.0 {
        return false;
    }
    if probability >= 1.0 {
        return true;
    }
    rand::rng().random::<f64>() > 1.0 - probability
}

/// Decide which of the spec's effects apply to a single request at `now`.
///
/// An expired spec decides to nothing while staying stored: expiry is a
/// behavioral gate here, not a storage-lifecycle event.
#[must_use]
pub fn decide(spec: &ChaosSpec, now: DateTime<Utc>) -> InjectionDecision {
    if spec.is_expired_at(now) {
        return InjectionDecision::default();
    }

    let delay = spec
        .delay
        .as_ref()
        .filter(|delay| hits(delay.probability))
        .map(|delay| DelayHit {
            duration: delay.duration,
            probability: delay.probability,
        });

    // A fresh draw, never reusing the delay draw
    let error = spec
        .error
        .as_ref()
        .filter(|error| hits(error.probability))
        .map(|error| ErrorHit {
            status_code: error.status_code,
            message: error.message.clone(),
            probability: error.probability,
        });

    InjectionDecision { delay, error }
}
