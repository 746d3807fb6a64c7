//! Event hooks for run lifecycle observation.
//!
//! Provides an optional, non-intrusive way to observe a run: submission,
//! every poll tick, backoff waits, swallowed transport glitches, and the
//! terminal status. Users can implement [`EventHandler`] for logging,
//! progress bars, or metrics without touching the client's control flow.

use crate::response::RunStatus;
use std::sync::Arc;
use std::time::Duration;

/// Events emitted while a run is driven to completion.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// The submission succeeded and a poll handle was obtained.
    Submitted {
        /// The opaque poll handle.
        handle: String,
    },
    /// The submission was rejected; the run is already terminal.
    SubmitFailed {
        /// Classified failure description.
        message: String,
    },
    /// One poll completed.
    Polled {
        /// 1-indexed poll attempt on this handle.
        attempt: u32,
        /// Whether the backend reports the job finished.
        completed: bool,
        /// The backend-reported status string, if any.
        status: Option<String>,
    },
    /// The loop is about to sleep before the next poll.
    Waiting {
        /// The backoff delay for this iteration.
        delay: Duration,
    },
    /// A poll failed and was swallowed (first consecutive failure only).
    TransportGlitch {
        /// 1-indexed poll attempt that failed.
        attempt: u32,
        /// Failure description.
        message: String,
    },
    /// The run reached a terminal status.
    Finished {
        /// `Success`, `Failed` or `Error`.
        status: RunStatus,
    },
}

/// Handler for run lifecycle events.
///
/// This is entirely optional -- runs work without an event handler.
///
/// # Example
///
/// ```
/// use modelflow::events::{EventHandler, RunEvent};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: RunEvent) {
///         match event {
///             RunEvent::Polled { attempt, completed, .. } => {
///                 println!("[poll {}] completed={}", attempt, completed)
///             }
///             RunEvent::Finished { status } => println!("[done] {:?}", status),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when the client emits an event.
    fn on_event(&self, event: RunEvent);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: RunEvent) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
///
/// # Example
///
/// ```
/// use modelflow::events::{FnEventHandler, RunEvent};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: RunEvent| {
///     if let RunEvent::Waiting { delay } = event {
///         eprintln!("backing off {:?}", delay);
///     }
/// }));
/// ```
pub struct FnEventHandler<F: Fn(RunEvent) + Send + Sync>(pub F);

impl<F: Fn(RunEvent) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: RunEvent) {
        (self.0)(event);
    }
}
