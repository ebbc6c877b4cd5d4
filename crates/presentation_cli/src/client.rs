//! Management protocol client
//!
//! Thin convenience wrapper marshaling chaos specs as JSON to a
//! running controller over TCP. Unix-socket controller binds are a
//! server-side option only; this client dials TCP addresses.

use anyhow::{Context, bail};
use serde::Serialize;

/// JSON body builder for one route chaos spec.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SpecBuilder {
    #[serde(skip_serializing_if = "Option::is_none")]
    delay: Option<DelayBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct DelayBody {
    duration: i64,
    p: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ErrorBody {
    status_code: u16,
    message: String,
    p: f64,
}

impl SpecBuilder {
    /// An empty spec: configures no effect at all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delay of `duration_millis` with probability `p`.
    #[must_use]
    pub fn delay(mut self, duration_millis: i64, p: f64) -> Self {
        self.delay = Some(DelayBody {
            duration: duration_millis,
            p,
        });
        self
    }

    /// Add an error with HTTP status `status_code`, optional body
    /// `message`, and probability `p`.
    #[must_use]
    pub fn error(mut self, status_code: u16, message: impl Into<String>, p: f64) -> Self {
        self.error = Some(ErrorBody {
            status_code,
            message: message.into(),
            p,
        });
        self
    }

    /// Limit the spec's effects to a relative duration (e.g. `"3s"`).
    #[must_use]
    pub fn during(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }
}

/// Chaos controller management client.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Client for the controller at `controller_addr` (host:port, or a
    /// full `http://` URL).
    #[must_use]
    pub fn new(controller_addr: &str) -> Self {
        let base_url = if controller_addr.starts_with("http://") {
            controller_addr.trim_end_matches('/').to_string()
        } else {
            format!("http://{controller_addr}")
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Set the chaos spec for the route `(method, path)`.
    pub async fn add_route_chaos(
        &self,
        method: &str,
        path: &str,
        spec: &SpecBuilder,
    ) -> anyhow::Result<()> {
        let response = self
            .http
            .put(format!("{}/", self.base_url))
            .query(&[("method", method), ("path", path)])
            .json(spec)
            .send()
            .await
            .context("error sending HTTP request")?;
        Self::expect_no_content(response).await
    }

    /// Fetch the controller's rendering of the spec for `(method, path)`.
    pub async fn get_route_chaos(&self, method: &str, path: &str) -> anyhow::Result<String> {
        let response = self
            .http
            .get(format!("{}/", self.base_url))
            .query(&[("method", method), ("path", path)])
            .send()
            .await
            .context("error sending HTTP request")?;

        let status = response.status();
        let body = response.text().await.context("unable to read response body")?;
        if !status.is_success() {
            bail!("controller error: {status}: {body}");
        }
        Ok(body)
    }

    /// Delete the chaos spec for the route `(method, path)`.
    pub async fn delete_route_chaos(&self, method: &str, path: &str) -> anyhow::Result<()> {
        let response = self
            .http
            .delete(format!("{}/", self.base_url))
            .query(&[("method", method), ("path", path)])
            .send()
            .await
            .context("error sending HTTP request")?;
        Self::expect_no_content(response).await
    }

    async fn expect_no_content(response: reqwest::Response) -> anyhow::Result<()> {
        let status = response.status();
        if status != reqwest::StatusCode::NO_CONTENT {
            let body = response.text().await.unwrap_or_default();
            bail!("controller error: {status}: {body}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec_serializes_to_empty_object() {
        let json = serde_json::to_value(SpecBuilder::new()).expect("serialize");
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn full_spec_matches_wire_format() {
        let spec = SpecBuilder::new()
            .delay(3000, 0.5)
            .error(504, "oh noes", 1.0)
            .during("3s");
        let json = serde_json::to_value(spec).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "delay": {"duration": 3000, "p": 0.5},
                "error": {"status_code": 504, "message": "oh noes", "p": 1.0},
                "duration": "3s",
            })
        );
    }

    #[test]
    fn bare_address_gains_scheme() {
        let client = Client::new("127.0.0.1:8666");
        assert_eq!(client.base_url, "http://127.0.0.1:8666");
    }

    #[test]
    fn full_url_is_kept() {
        let client = Client::new("http://chaos.internal:9999/");
        assert_eq!(client.base_url, "http://chaos.internal:9999");
    }
}
