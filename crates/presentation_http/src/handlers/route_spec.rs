//! Route chaos spec handlers
//!
//! The controller exposes a single logical resource addressed by the
//! `method` and `path` query parameters; the verb selects the
//! operation. Missing parameters are rejected before any registry
//! access.

use std::fmt::Write as _;

use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use domain::{ChaosSpec, DelaySpec, ErrorSpec, RouteKey};
use serde::Deserialize;
use tracing::info;

use crate::{error::ApiError, state::AppState};

/// Query parameters addressing one route key.
///
/// Both are declared optional so that absence yields the controller's
/// own 400 message rather than a generic extractor rejection.
#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    method: Option<String>,
    path: Option<String>,
}

impl RouteQuery {
    fn route_key(&self) -> Result<RouteKey, ApiError> {
        let method = self
            .method
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ApiError::BadRequest("missing value for method parameter".to_string()))?;
        let path = self
            .path
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::BadRequest("missing value for path parameter".to_string()))?;
        Ok(RouteKey::new(method, path))
    }
}

/// Wire shape of a chaos spec, all fields optional.
///
/// Absence of a field means "no such effect configured"; the stored
/// spec is always fully replaced, never patched.
#[derive(Debug, Default, Deserialize)]
pub struct ChaosSpecBody {
    #[serde(default)]
    delay: Option<DelayBody>,
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DelayBody {
    /// Delay duration in milliseconds
    duration: i64,
    #[serde(rename = "p")]
    probability: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_code: u16,
    #[serde(default)]
    message: String,
    #[serde(rename = "p")]
    probability: f64,
}

impl ChaosSpecBody {
    /// Convert the wire shape into a validated domain spec.
    ///
    /// A relative `duration` string is pinned to the absolute instant
    /// `now + duration` here, at write time.
    fn into_spec(self, now: DateTime<Utc>) -> Result<ChaosSpec, ApiError> {
        let delay = self
            .delay
            .map(|d| DelaySpec::new(d.duration, d.probability))
            .transpose()?;
        let error = self
            .error
            .map(|e| ErrorSpec::new(e.status_code, e.message, e.probability))
            .transpose()?;
        let until = self
            .duration
            .map(|s| ChaosSpec::until_from_str(&s, now))
            .transpose()?;
        Ok(ChaosSpec::new(delay, error, until))
    }
}

/// `PUT /?method=<M>&path=<P>`: create or fully replace the spec for a
/// route. `204` on acceptance, `400` with the specific validation
/// failure otherwise.
pub async fn set_route_spec(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let key = query.route_key()?;

    let body: ChaosSpecBody = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;
    let spec = body.into_spec(Utc::now())?;

    state.registry.set(key.clone(), spec)?;
    info!(route = %key, "route chaos spec set");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /?method=<M>&path=<P>`: plain-text rendering of whichever
/// fields are set, or `404`.
///
/// The spec is reported exactly as stored; a logically expired entry
/// is still shown, with an explicit `(expired)` marker on its `Until`
/// line so the read path does not silently contradict the middleware.
pub async fn get_route_spec(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<String, ApiError> {
    let key = query.route_key()?;
    let spec = state.registry.get(&key).ok_or_else(ApiError::no_such_route)?;

    let mut rendering = String::new();
    if let Some(delay) = &spec.delay {
        let _ = writeln!(rendering, "Delay: {delay}");
    }
    if let Some(error) = &spec.error {
        let _ = writeln!(rendering, "Error: {error}");
    }
    if let Some(until) = spec.until {
        let marker = if spec.is_expired_at(Utc::now()) {
            " (expired)"
        } else {
            ""
        };
        let _ = writeln!(rendering, "Until: {until}{marker}");
    }
    Ok(rendering)
}

/// Any verb other than GET, PUT, or DELETE. Parameters are still
/// checked first, so a missing `method`/`path` answers `400` before
/// the verb is judged.
pub async fn method_not_allowed(Query(query): Query<RouteQuery>) -> Result<StatusCode, ApiError> {
    query.route_key()?;
    Ok(StatusCode::METHOD_NOT_ALLOWED)
}

/// `DELETE /?method=<M>&path=<P>`: `204` if the entry existed, `404`
/// otherwise.
pub async fn delete_route_spec(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<StatusCode, ApiError> {
    let key = query.route_key()?;
    if state.registry.delete(&key) {
        info!(route = %key, "route chaos spec deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::no_such_route())
    }
}
