//! Adaptive wait schedule for status polling.
//!
//! [`PollSchedule`] controls how the wait between polls grows and when the
//! loop gives up. The growth is deterministic: each wait is the previous one
//! times 1.1, capped at 60 seconds. Presets match the platform's observed
//! budgets: [`PollSchedule::asset()`] for direct asset runs,
//! [`PollSchedule::pipeline()`] for full pipeline runs.

use std::time::Duration;

/// Waits shorter than this are rounded up; hammering the poll endpoint
/// faster buys nothing.
pub const WAIT_FLOOR: Duration = Duration::from_millis(200);

/// Waits never grow past this.
pub const WAIT_CEILING: Duration = Duration::from_secs(60);

/// Growth factor applied to the wait after every pending poll.
pub const WAIT_GROWTH: f64 = 1.1;

/// Configuration for the poll loop's pacing and deadline.
///
/// # Example
///
/// ```
/// use modelflow::execution::PollSchedule;
/// use std::time::Duration;
///
/// let schedule = PollSchedule::asset();
/// assert_eq!(schedule.timeout, Duration::from_secs(300));
///
/// let patient = PollSchedule::pipeline().with_timeout(Duration::from_secs(3600));
/// assert_eq!(patient.timeout, Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct PollSchedule {
    /// Wait before the second poll. Subject to [`WAIT_FLOOR`].
    pub initial_wait: Duration,
    /// Total budget for the loop; expiry is a terminal error, not a retry.
    pub timeout: Duration,
}

impl PollSchedule {
    /// Pacing for direct asset runs: 0.5 s initial wait, 300 s budget.
    pub fn asset() -> Self {
        Self {
            initial_wait: Duration::from_millis(500),
            timeout: Duration::from_secs(300),
        }
    }

    /// Pacing for pipeline runs: 1 s initial wait, 20 000 s budget.
    pub fn pipeline() -> Self {
        Self {
            initial_wait: Duration::from_secs(1),
            timeout: Duration::from_secs(20_000),
        }
    }

    /// Override the total budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the initial wait.
    pub fn with_initial_wait(mut self, wait: Duration) -> Self {
        self.initial_wait = wait;
        self
    }

    /// The wait used after the first pending poll.
    pub fn first_wait(&self) -> Duration {
        self.initial_wait.max(WAIT_FLOOR)
    }

    /// The wait following `current`: grown by [`WAIT_GROWTH`], capped at
    /// [`WAIT_CEILING`].
    pub fn next_wait(&self, current: Duration) -> Duration {
        current.mul_f64(WAIT_GROWTH).min(WAIT_CEILING)
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::asset()
    }
}
