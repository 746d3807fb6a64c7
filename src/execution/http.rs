//! HTTP transport against the platform's execution endpoints.
//!
//! [`HttpTransport`] posts submissions and polls handles with the caller's
//! API key in the `x-api-key` header. Non-success statuses are pushed
//! through the [`classifier`](crate::classifier) before they reach the
//! client layer.

use super::Transport;
use crate::classifier::{classify, classify_transport, ErrorKind, PlatformError};
use crate::response::PollResponse;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Production transport speaking the platform's JSON protocol.
///
/// Submission replies carry the poll handle under `"data"`:
/// `{"data": "https://…/poll/abc123"}`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }

    /// Pull a human-readable detail out of an error body.
    ///
    /// Bodies are usually JSON with one of a few well-known keys; anything
    /// unparseable is passed through verbatim.
    fn extract_detail(body: &str) -> Option<String> {
        if body.is_empty() {
            return None;
        }
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            for key in ["error", "message", "detail", "supplierError"] {
                if let Some(detail) = value.get(key).and_then(|v| v.as_str()) {
                    return Some(detail.to_string());
                }
            }
        }
        Some(body.to_string())
    }

    async fn error_from(response: reqwest::Response) -> PlatformError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        classify(status, Self::extract_detail(&body).as_deref())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(
        &self,
        client: &Client,
        url: &str,
        api_key: &str,
        payload: &Value,
    ) -> Result<String, PlatformError> {
        let response = client
            .post(url)
            .header("x-api-key", api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| classify_transport(format!("failed to reach {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PlatformError::new(ErrorKind::Internal, None, format!("malformed submit reply: {e}")))?;

        body.get("data")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                PlatformError::new(
                    ErrorKind::Internal,
                    None,
                    "submit reply carried no poll handle".to_string(),
                )
            })
    }

    async fn poll(
        &self,
        client: &Client,
        poll_url: &str,
        api_key: &str,
    ) -> Result<PollResponse, PlatformError> {
        let response = client
            .get(poll_url)
            .header("x-api-key", api_key)
            .send()
            .await
            .map_err(|e| classify_transport(format!("failed to reach {}: {}", poll_url, e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| PlatformError::new(ErrorKind::Internal, None, format!("malformed poll reply: {e}")))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
