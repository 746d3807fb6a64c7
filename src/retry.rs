//! Caller-layer retry over retryable platform failures.
//!
//! The execution client never retries a failed submission; agent-style
//! callers that want another attempt wrap their calls in a [`RetryPolicy`].
//! The policy only retries error kinds marked retryable and paces attempts
//! with the same 1.1×/60 s schedule the poll loop uses rather than inventing
//! a second backoff scheme.

use crate::classifier::PlatformError;
use crate::execution::PollSchedule;
use std::future::Future;

/// Retry configuration for operations returning
/// [`PlatformError`] on failure.
///
/// # Example
///
/// ```
/// use modelflow::RetryPolicy;
///
/// let policy = RetryPolicy::new(3);
/// assert_eq!(policy.max_retries, 3);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retry attempts (not counting the initial call).
    pub max_retries: u32,
    /// Pacing between attempts; the poll schedule's growth applies.
    pub schedule: PollSchedule,
}

impl RetryPolicy {
    /// Retry up to `max_retries` times with the asset schedule's pacing.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            schedule: PollSchedule::asset(),
        }
    }

    /// Use a different schedule for pacing.
    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Whether another attempt should be made after `error` on `attempt`
    /// (0-indexed).
    pub fn should_retry(&self, error: &PlatformError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }

    /// Run `op`, retrying retryable failures until the budget is spent.
    ///
    /// Returns the first success or the last error. Non-retryable kinds
    /// (validation, authentication, billing, resource) abort immediately.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, PlatformError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PlatformError>>,
    {
        let mut wait = self.schedule.first_wait();
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !self.should_retry(&error, attempt) {
                        return Err(error);
                    }
                    tracing::debug!(attempt, error = %error, delay = ?wait, "retrying platform call");
                    tokio::time::sleep(wait).await;
                    wait = self.schedule.next_wait(wait);
                    attempt += 1;
                }
            }
        }
    }
}
