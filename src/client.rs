//! The execution client: submission and the poll state machine.
//!
//! A run moves through `NotSubmitted → Submitting → InProgress` and ends in
//! exactly one of `Success`, `Failed` or `Error`:
//!
//! - [`ExecutionClient::submit`] performs one HTTP call. A non-2xx reply is
//!   classified and terminal (`Failed`): no retry, no poll.
//! - Once a poll handle exists, [`ExecutionClient::poll_until_done`] drives a
//!   blocking wait loop: poll, sleep, grow the wait by 1.1× up to 60 s, and
//!   give up with a terminal `Error` when the schedule's timeout elapses.
//!   One poll transport failure per loop is swallowed; a second consecutive
//!   one is terminal.
//!
//! Each `run` occupies its task for up to the schedule's timeout; callers
//! needing concurrency spawn multiple runs on separate tasks. There is no
//! cancellation beyond timeout expiry.

use crate::classifier::PlatformError;
use crate::designer::Pipeline;
use crate::error::Result as DesignResult;
use crate::events::{emit, EventHandler, RunEvent};
use crate::execution::{HttpTransport, PollSchedule, Transport};
use crate::response::{PollResponse, RunOutcome, RunStatus};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Path for direct single-asset runs, joined with the asset id.
pub const ASSET_RUN_PATH: &str = "execute";

/// Path accepting a serialized graph for ad-hoc pipeline runs.
pub const PIPELINE_RUN_PATH: &str = "pipeline/run";

/// Client for submitting work to the platform and observing it to
/// completion.
///
/// # Example
///
/// ```no_run
/// use modelflow::{ExecutionClient, PollSchedule};
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() {
///     let client = ExecutionClient::builder("https://platform.example.com", "team-api-key")
///         .build();
///     let outcome = client.run_asset("6239efa4822d7a13b8e20454", json!("hello")).await;
///     println!("{:?} {:?}", outcome.status, outcome.data);
/// }
/// ```
pub struct ExecutionClient {
    http: Client,
    base_url: String,
    api_key: String,
    transport: Arc<dyn Transport>,
    events: Option<Arc<dyn EventHandler>>,
}

impl ExecutionClient {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>, api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            http: None,
            base_url: base_url.into(),
            api_key: api_key.into(),
            transport: None,
            events: None,
            request_timeout: None,
        }
    }

    /// Submit a payload to `path` under the base URL.
    ///
    /// One synchronous HTTP call: a 2xx reply yields the poll handle, any
    /// other reply comes back as a classified [`PlatformError`]. This layer
    /// never retries a failed submission.
    pub async fn submit(&self, path: &str, payload: &Value) -> Result<String, PlatformError> {
        let url = self.join(path);
        tracing::debug!(url = %url, transport = self.transport.name(), "submitting job");
        match self.transport.submit(&self.http, &url, &self.api_key, payload).await {
            Ok(handle) => {
                tracing::debug!(handle = %handle, "job accepted");
                emit(&self.events, RunEvent::Submitted { handle: handle.clone() });
                Ok(handle)
            }
            Err(error) => {
                tracing::error!(url = %url, error = %error, "submission rejected");
                emit(&self.events, RunEvent::SubmitFailed { message: error.to_string() });
                Err(error)
            }
        }
    }

    /// Query a poll handle once.
    pub async fn poll(&self, handle: &str) -> Result<PollResponse, PlatformError> {
        self.transport.poll(&self.http, handle, &self.api_key).await
    }

    /// Drive a poll handle to a terminal outcome.
    ///
    /// Polls, then sleeps with the schedule's growing wait, until the backend
    /// reports completion or the schedule's timeout elapses. Timeout expiry
    /// ends the run with [`RunStatus::Error`], never `Failed`. A single
    /// failing poll is tolerated per loop; two consecutive failures on the
    /// same handle are terminal.
    pub async fn poll_until_done(&self, handle: &str, schedule: &PollSchedule) -> RunOutcome {
        let start = Instant::now();
        let mut wait = schedule.first_wait();
        let mut consecutive_failures: u32 = 0;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.poll(handle).await {
                Ok(response) => {
                    consecutive_failures = 0;
                    tracing::debug!(
                        attempt,
                        completed = response.completed,
                        status = response.status.as_deref().unwrap_or("-"),
                        "poll"
                    );
                    emit(
                        &self.events,
                        RunEvent::Polled {
                            attempt,
                            completed: response.completed,
                            status: response.status.clone(),
                        },
                    );
                    if response.completed {
                        let outcome = if response.is_success() {
                            RunOutcome::success(response, start.elapsed())
                        } else {
                            RunOutcome::failed(response, start.elapsed())
                        };
                        emit(&self.events, RunEvent::Finished { status: outcome.status });
                        return outcome;
                    }
                }
                Err(error) => {
                    consecutive_failures += 1;
                    tracing::error!(attempt, error = %error, "poll failed");
                    if consecutive_failures >= 2 {
                        emit(&self.events, RunEvent::Finished { status: RunStatus::Error });
                        return RunOutcome::client_error(
                            format!("polling failed twice in a row: {error}"),
                            Some(error),
                            start.elapsed(),
                        );
                    }
                    emit(
                        &self.events,
                        RunEvent::TransportGlitch { attempt, message: error.to_string() },
                    );
                }
            }

            emit(&self.events, RunEvent::Waiting { delay: wait });
            tokio::time::sleep(wait).await;
            wait = schedule.next_wait(wait);

            if start.elapsed() >= schedule.timeout {
                tracing::error!(handle = %handle, timeout = ?schedule.timeout, "poll budget exhausted");
                emit(&self.events, RunEvent::Finished { status: RunStatus::Error });
                return RunOutcome::client_error(
                    format!("no response within {} seconds", schedule.timeout.as_secs()),
                    None,
                    start.elapsed(),
                );
            }
        }
    }

    /// Submit and poll to completion: the whole state machine in one call.
    ///
    /// Submission failures yield a terminal `Failed` outcome carrying the
    /// classified error; no poll is attempted.
    pub async fn run(&self, path: &str, payload: &Value, schedule: &PollSchedule) -> RunOutcome {
        let start = Instant::now();
        match self.submit(path, payload).await {
            Ok(handle) => self.poll_until_done(&handle, schedule).await,
            Err(error) => RunOutcome::submit_failed(error, start.elapsed()),
        }
    }

    /// Run a single asset with a `{"data": …}` payload and the asset
    /// schedule (300 s budget).
    pub async fn run_asset(&self, asset_id: &str, data: Value) -> RunOutcome {
        self.run(
            &format!("{}/{}", ASSET_RUN_PATH, asset_id),
            &json!({ "data": data }),
            &PollSchedule::asset(),
        )
        .await
    }

    /// Run a single asset with explicit function parameters.
    pub async fn run_asset_with_params(
        &self,
        asset_id: &str,
        data: Value,
        parameters: Value,
    ) -> RunOutcome {
        self.run(
            &format!("{}/{}", ASSET_RUN_PATH, asset_id),
            &json!({ "data": data, "parameters": parameters }),
            &PollSchedule::asset(),
        )
        .await
    }

    /// Validate, serialize and run a designed pipeline.
    ///
    /// Design problems surface as [`DesignError`](crate::DesignError)s before
    /// anything touches the network; execution problems are captured in the
    /// returned [`RunOutcome`]. On a successful submission the pipeline
    /// records its poll handle as the remote reference.
    pub async fn run_pipeline(
        &self,
        pipeline: &mut Pipeline,
        input: Value,
        schedule: &PollSchedule,
    ) -> DesignResult<RunOutcome> {
        pipeline.ensure_runnable()?;
        let payload = json!({ "graph": pipeline.serialize(), "data": input });
        let start = Instant::now();
        match self.submit(PIPELINE_RUN_PATH, &payload).await {
            Ok(handle) => {
                pipeline.set_remote_handle(handle.clone());
                Ok(self.poll_until_done(&handle, schedule).await)
            }
            Err(error) => Ok(RunOutcome::submit_failed(error, start.elapsed())),
        }
    }

    fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for ExecutionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionClient")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport.name())
            .field("has_events", &self.events.is_some())
            .finish()
    }
}

/// Builder for [`ExecutionClient`].
pub struct ClientBuilder {
    http: Option<Client>,
    base_url: String,
    api_key: String,
    transport: Option<Arc<dyn Transport>>,
    events: Option<Arc<dyn EventHandler>>,
    request_timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Set the transport. Default: [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the event handler.
    pub fn events(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.events = Some(handler);
        self
    }

    /// Set the per-request timeout. Default: 60 seconds.
    ///
    /// Ignored when a custom `Client` is supplied via
    /// [`http_client`](Self::http_client); that client's own timeout applies.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> ExecutionClient {
        let timeout = self.request_timeout.unwrap_or(Duration::from_secs(60));
        let http = self.http.unwrap_or_else(|| {
            Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client")
        });
        ExecutionClient {
            http,
            base_url: self.base_url,
            api_key: self.api_key,
            transport: self.transport.unwrap_or_else(|| Arc::new(HttpTransport::new())),
            events: self.events,
        }
    }
}
