//! Management API error handling
//!
//! The management protocol replies with plain-text reasons: validation
//! failures never mutate state and are final for that request, and a
//! miss on read/delete is a normal outcome, not a defect.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::DomainError;
use thiserror::Error;

/// Management API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing parameter, malformed body, or spec validation failure
    #[error("{0}")]
    BadRequest(String),

    /// No spec configured for the requested route key
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// 404 with the controller's standard miss message.
    #[must_use]
    pub fn no_such_route() -> Self {
        Self::NotFound("no such route".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
