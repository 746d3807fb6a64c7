//! Transport trait and the submit/poll wire contract.
//!
//! The [`Transport`] trait abstracts over the platform's two execution
//! endpoints, translating between normalized types and the HTTP API.
//! Built-in implementations: [`HttpTransport`], [`MockTransport`].
//!
//! ## Architecture
//!
//! ```text
//! ExecutionClient ──► Transport::submit() ──► poll handle
//!        │                    │
//!        │           ┌────────┴────────┐
//!        │      HttpTransport     MockTransport
//!        │      POST + x-api-key  canned replies
//!        │
//!        └──► Transport::poll() ──► PollResponse  (×N, backoff per PollSchedule)
//! ```

pub mod http;
pub mod mock;
pub mod schedule;

pub use http::HttpTransport;
pub use mock::MockTransport;
pub use schedule::PollSchedule;

use crate::classifier::PlatformError;
use crate::response::PollResponse;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Abstraction over the platform's execution endpoints.
///
/// Implementors translate a submission payload into a poll handle and a poll
/// handle into a [`PollResponse`]. Errors must already be classified; the
/// client layer never inspects raw statuses.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit a payload to `url`, returning the opaque poll handle.
    async fn submit(
        &self,
        client: &Client,
        url: &str,
        api_key: &str,
        payload: &Value,
    ) -> Result<String, PlatformError>;

    /// Query the status of a previously submitted job.
    async fn poll(
        &self,
        client: &Client,
        poll_url: &str,
        api_key: &str,
    ) -> Result<PollResponse, PlatformError>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}
