//! Poll responses and terminal run outcomes.

use crate::classifier::PlatformError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Status of a run as reported by the backend or concluded by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// The job is still executing; only ever observed mid-poll.
    InProgress,
    /// The job finished and produced a payload.
    Success,
    /// The job (or its submission) failed on the platform side.
    Failed,
    /// The client gave up: timeout expiry or repeated poll failures.
    Error,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::InProgress => "IN_PROGRESS",
            RunStatus::Success => "SUCCESS",
            RunStatus::Failed => "FAILED",
            RunStatus::Error => "ERROR",
        }
    }
}

/// One poll of the backend's status endpoint.
///
/// Field names follow the wire payload; unknown statuses deserialize as the
/// raw string and are treated as not-successful.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollResponse {
    /// Whether the job has reached a terminal state.
    #[serde(default)]
    pub completed: bool,
    /// Backend-reported status string (e.g. `"IN_PROGRESS"`, `"SUCCESS"`).
    #[serde(default)]
    pub status: Option<String>,
    /// Result payload, present once the job succeeds.
    #[serde(default)]
    pub data: Option<Value>,
    /// Credits consumed so far.
    #[serde(default, rename = "usedCredits")]
    pub used_credits: f64,
    /// Backend-side execution time in seconds.
    #[serde(default, rename = "runTime")]
    pub run_time: f64,
    /// Failure detail reported alongside a terminal status.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl PollResponse {
    /// A pending response, as returned while the job is still running.
    pub fn pending() -> Self {
        Self {
            completed: false,
            status: Some(RunStatus::InProgress.as_str().to_string()),
            ..Self::default()
        }
    }

    /// A completed response with the given status and payload.
    pub fn done(status: &str, data: Value) -> Self {
        Self {
            completed: true,
            status: Some(status.to_string()),
            data: Some(data),
            ..Self::default()
        }
    }

    /// Whether the reported status spells success with no error attached.
    pub fn is_success(&self) -> bool {
        self.completed
            && self.error_message.is_none()
            && self.status.as_deref() == Some(RunStatus::Success.as_str())
    }
}

/// The terminal state of one run.
///
/// Execution failures are captured here rather than raised, so callers
/// branch on [`status`](Self::status) without error plumbing.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Terminal status: `Success`, `Failed` or `Error`.
    pub status: RunStatus,
    /// Result payload, for successful runs.
    pub data: Option<Value>,
    /// The classified failure, when the platform rejected or failed the run.
    pub error: Option<PlatformError>,
    /// Human-readable failure detail.
    pub message: Option<String>,
    /// Credits consumed.
    pub used_credits: f64,
    /// Backend-side execution time in seconds.
    pub run_time: f64,
    /// Wall-clock time spent by the client on this run.
    pub elapsed: Duration,
}

impl RunOutcome {
    pub(crate) fn success(response: PollResponse, elapsed: Duration) -> Self {
        Self {
            status: RunStatus::Success,
            data: response.data,
            error: None,
            message: None,
            used_credits: response.used_credits,
            run_time: response.run_time,
            elapsed,
        }
    }

    pub(crate) fn failed(response: PollResponse, elapsed: Duration) -> Self {
        Self {
            status: RunStatus::Failed,
            data: response.data,
            error: None,
            message: response
                .error_message
                .or(response.status)
                .or_else(|| Some("job failed".to_string())),
            used_credits: response.used_credits,
            run_time: response.run_time,
            elapsed,
        }
    }

    pub(crate) fn submit_failed(error: PlatformError, elapsed: Duration) -> Self {
        Self {
            status: RunStatus::Failed,
            data: None,
            message: Some(error.to_string()),
            error: Some(error),
            used_credits: 0.0,
            run_time: 0.0,
            elapsed,
        }
    }

    pub(crate) fn client_error(
        message: impl Into<String>,
        error: Option<PlatformError>,
        elapsed: Duration,
    ) -> Self {
        Self {
            status: RunStatus::Error,
            data: None,
            error,
            message: Some(message.into()),
            used_credits: 0.0,
            run_time: 0.0,
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_poll_response_wire_names() {
        let wire = json!({
            "completed": true,
            "status": "SUCCESS",
            "data": "https://platform.example.com/result/1",
            "usedCredits": 0.25,
            "runTime": 3.2
        });
        let resp: PollResponse = serde_json::from_value(wire).unwrap();
        assert!(resp.completed);
        assert!(resp.is_success());
        assert_eq!(resp.used_credits, 0.25);
        assert_eq!(resp.run_time, 3.2);
    }

    #[test]
    fn test_poll_response_defaults_missing_fields() {
        let resp: PollResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!resp.completed);
        assert!(resp.status.is_none());
        assert!(!resp.is_success());
    }

    #[test]
    fn test_completed_with_error_message_is_not_success() {
        let mut resp = PollResponse::done("SUCCESS", json!(null));
        resp.error_message = Some("supplierError".into());
        assert!(!resp.is_success());
    }

    #[test]
    fn test_failed_outcome_prefers_error_message() {
        let mut resp = PollResponse::done("FAILED", json!(null));
        resp.error_message = Some("model crashed".into());
        let outcome = RunOutcome::failed(resp, Duration::from_secs(1));
        assert_eq!(outcome.status, RunStatus::Failed);
        assert_eq!(outcome.message.as_deref(), Some("model crashed"));
    }

    #[test]
    fn test_run_status_strings() {
        assert_eq!(RunStatus::Success.as_str(), "SUCCESS");
        assert_eq!(RunStatus::InProgress.as_str(), "IN_PROGRESS");
        let parsed: RunStatus = serde_json::from_value(json!("FAILED")).unwrap();
        assert_eq!(parsed, RunStatus::Failed);
    }
}
