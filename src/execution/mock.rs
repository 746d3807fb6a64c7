//! Mock transport for testing without a live platform.
//!
//! [`MockTransport`] replays scripted submit/poll results in order, allowing
//! downstream consumers to write deterministic tests against this crate.
//!
//! # Example
//!
//! ```
//! use modelflow::execution::MockTransport;
//! use serde_json::json;
//!
//! let mock = MockTransport::new()
//!     .submit_ok("poll/abc")
//!     .poll_pending()
//!     .poll_done("SUCCESS", json!("bonjour"));
//! ```

use super::Transport;
use crate::classifier::PlatformError;
use crate::response::PollResponse;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A test transport that returns scripted results in order.
///
/// When a queue runs out, its last entry repeats forever: a terminal
/// response stays terminal, and an endless-pending script needs only one
/// entry. Call counters let tests assert how far a run got.
#[derive(Debug, Default)]
pub struct MockTransport {
    submits: Mutex<Vec<Result<String, PlatformError>>>,
    polls: Mutex<Vec<Result<PollResponse, PlatformError>>>,
    submit_calls: AtomicUsize,
    poll_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful submission returning the given poll handle.
    pub fn submit_ok(self, handle: impl Into<String>) -> Self {
        self.submits.lock().unwrap().push(Ok(handle.into()));
        self
    }

    /// Script a failed submission.
    pub fn submit_err(self, error: PlatformError) -> Self {
        self.submits.lock().unwrap().push(Err(error));
        self
    }

    /// Script one not-yet-completed poll.
    pub fn poll_pending(self) -> Self {
        self.polls.lock().unwrap().push(Ok(PollResponse::pending()));
        self
    }

    /// Script a completed poll with the given status and payload.
    pub fn poll_done(self, status: &str, data: Value) -> Self {
        self.polls.lock().unwrap().push(Ok(PollResponse::done(status, data)));
        self
    }

    /// Script an arbitrary poll response.
    pub fn poll_response(self, response: PollResponse) -> Self {
        self.polls.lock().unwrap().push(Ok(response));
        self
    }

    /// Script a failing poll (transport or classified HTTP error).
    pub fn poll_err(self, error: PlatformError) -> Self {
        self.polls.lock().unwrap().push(Err(error));
        self
    }

    /// How many submissions were attempted.
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::Relaxed)
    }

    /// How many polls were attempted.
    pub fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::Relaxed)
    }

    fn take<T: Clone>(queue: &Mutex<Vec<T>>, counter: &AtomicUsize, what: &str) -> T {
        let index = counter.fetch_add(1, Ordering::Relaxed);
        let queue = queue.lock().unwrap();
        assert!(!queue.is_empty(), "MockTransport has no scripted {} results", what);
        queue[index.min(queue.len() - 1)].clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn submit(
        &self,
        _client: &Client,
        _url: &str,
        _api_key: &str,
        _payload: &Value,
    ) -> Result<String, PlatformError> {
        Self::take(&self.submits, &self.submit_calls, "submit")
    }

    async fn poll(
        &self,
        _client: &Client,
        _poll_url: &str,
        _api_key: &str,
    ) -> Result<PollResponse, PlatformError> {
        Self::take(&self.polls, &self.poll_calls, "poll")
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_replays_in_order_then_repeats_last() {
        let mock = MockTransport::new()
            .poll_pending()
            .poll_done("SUCCESS", json!(42));
        let client = Client::new();

        let first = mock.poll(&client, "h", "key").await.unwrap();
        assert!(!first.completed);
        let second = mock.poll(&client, "h", "key").await.unwrap();
        assert!(second.completed);
        // queue exhausted: last entry repeats
        let third = mock.poll(&client, "h", "key").await.unwrap();
        assert!(third.completed);
        assert_eq!(mock.poll_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_submit_counting() {
        let mock = MockTransport::new().submit_ok("poll/xyz");
        let client = Client::new();
        assert_eq!(mock.submit_calls(), 0);
        let handle = mock.submit(&client, "u", "key", &json!({})).await.unwrap();
        assert_eq!(handle, "poll/xyz");
        assert_eq!(mock.submit_calls(), 1);
        assert_eq!(mock.poll_calls(), 0);
    }
}
