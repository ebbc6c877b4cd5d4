//! Chaos injection middleware
//!
//! Wraps a downstream service; on each request it derives the route
//! key from the method and URI path exactly as received, looks the key
//! up in the shared registry, and applies whatever the injection
//! engine decides: an interruptible sleep, a substituted error
//! response, both, or nothing. No registry lock is held while
//! sleeping, and the read path never mutates the registry.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use application::{ChaosRegistry, DelayHit, ErrorHit, decide};
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use domain::RouteKey;
use tower::{Layer, Service};
use tracing::debug;

/// Response annotation naming a fired delay's duration and probability
pub const DELAY_HEADER: &str = "X-Chaos-Injected-Delay";

/// Response annotation naming a fired error's status and probability
pub const ERROR_HEADER: &str = "X-Chaos-Injected-Error";

/// Layer that adds chaos injection to HTTP services
#[derive(Debug, Clone)]
pub struct ChaosLayer {
    registry: Arc<ChaosRegistry>,
}

impl ChaosLayer {
    /// Create a chaos layer reading from the given registry.
    #[must_use]
    pub fn new(registry: Arc<ChaosRegistry>) -> Self {
        Self { registry }
    }
}

impl<S> Layer<S> for ChaosLayer {
    type Service = ChaosService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ChaosService {
            inner,
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Service that injects configured chaos into each matching request
#[derive(Debug, Clone)]
pub struct ChaosService<S> {
    inner: S,
    registry: Arc<ChaosRegistry>,
}

impl<S> Service<Request<Body>> for ChaosService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let key = RouteKey::new(request.method().as_str(), request.uri().path());
        let registry = Arc::clone(&self.registry);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(spec) = registry.get(&key) else {
                return inner.call(request).await;
            };

            // Decided up front; the sleep below holds no lock.
            let decision = decide(&spec, Utc::now());

            let delay_header = if let Some(delay) = &decision.delay {
                debug!(route = %key, duration = ?delay.duration, "injecting delay");
                tokio::time::sleep(delay.duration).await;
                delay_annotation(delay)
            } else {
                None
            };

            if let Some(error) = decision.error {
                debug!(route = %key, status = error.status_code, "injecting error");
                return Ok(injected_error_response(&error, delay_header));
            }

            let mut response = inner.call(request).await?;
            if let Some(value) = delay_header {
                response.headers_mut().insert(DELAY_HEADER, value);
            }
            Ok(response)
        })
    }
}

fn delay_annotation(delay: &DelayHit) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{} (probability: {:.1})",
        humantime::format_duration(delay.duration),
        delay.probability
    ))
    .ok()
}

/// Build the short-circuit response for an error hit: the configured
/// status code with the configured message as the full body, annotated
/// with whichever injection headers apply.
fn injected_error_response(error: &ErrorHit, delay_header: Option<HeaderValue>) -> Response<Body> {
    let status =
        StatusCode::from_u16(error.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, error.message.clone()).into_response();

    if let Ok(value) = HeaderValue::from_str(&format!(
        "{} (probability: {:.1})",
        error.status_code, error.probability
    )) {
        response.headers_mut().insert(ERROR_HEADER, value);
    }
    if let Some(value) = delay_header {
        response.headers_mut().insert(DELAY_HEADER, value);
    }
    response
}
