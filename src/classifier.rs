//! Translation of HTTP statuses and transport failures into a closed error
//! taxonomy.
//!
//! [`classify`] is a pure function of `(status, detail)`; it performs no I/O
//! and is the only place wire failures become [`PlatformError`]s. Whether an
//! error is worth retrying is a static property of its [`ErrorKind`],
//! consumed by caller-side policies ([`RetryPolicy`](crate::retry::RetryPolicy));
//! the execution client itself never retries a failed submission.

use thiserror::Error;

/// The closed set of platform failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed or rejected by input validation.
    Validation,
    /// The API key was missing, invalid, or lacks permission.
    Authentication,
    /// Credits or billing state block the call.
    Billing,
    /// The referenced asset/resource is unavailable.
    Resource,
    /// An upstream supplier failed or rate-limited the call.
    Supplier,
    /// An unspecified platform-side failure.
    Internal,
    /// The service is down or overloaded.
    Service,
    /// The network path failed (gateway timeout, broken transport).
    Network,
}

impl ErrorKind {
    /// Whether a caller-side retry has a chance of succeeding.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Supplier | ErrorKind::Internal | ErrorKind::Service | ErrorKind::Network
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Billing => "billing",
            ErrorKind::Resource => "resource",
            ErrorKind::Supplier => "supplier",
            ErrorKind::Internal => "internal",
            ErrorKind::Service => "service",
            ErrorKind::Network => "network",
        }
    }
}

/// A typed failure reported by (or on the way to) the platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PlatformError {
    kind: ErrorKind,
    status: Option<u16>,
    tag: Option<&'static str>,
    message: String,
}

impl PlatformError {
    pub(crate) fn new(kind: ErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            tag: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// `"Client"`/`"Server"` for statuses outside the known table.
    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Shorthand for `self.kind().is_retryable()`.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Map an HTTP status (plus an optional body-provided detail) onto the
/// taxonomy.
///
/// The backend reserves extension ranges inside 4xx: 460–469 behave like
/// resource errors, 470–479 like billing, 480–489 like supplier failures and
/// 490–499 like validation failures. Anything else falls back to a generic
/// internal error tagged `"Client"` or `"Server"`.
pub fn classify(status: u16, detail: Option<&str>) -> PlatformError {
    let message = |fallback: &str| detail.unwrap_or(fallback).to_string();
    match status {
        400 | 490..=499 => PlatformError::new(
            ErrorKind::Validation,
            Some(status),
            message("invalid request payload"),
        ),
        401 => PlatformError::new(
            ErrorKind::Authentication,
            Some(status),
            message("unauthorized api key"),
        ),
        402 | 470..=479 => PlatformError::new(
            ErrorKind::Billing,
            Some(status),
            message("billing problem or insufficient credits"),
        ),
        403 | 404 | 460..=469 => PlatformError::new(
            ErrorKind::Resource,
            Some(status),
            message("requested resource is unavailable"),
        ),
        429 | 480..=489 => PlatformError::new(
            ErrorKind::Supplier,
            Some(status),
            message("supplier rate-limited or failed the call"),
        ),
        500 => PlatformError::new(ErrorKind::Internal, Some(status), message("internal platform error")),
        503 => PlatformError::new(ErrorKind::Service, Some(status), message("service unavailable")),
        504 => PlatformError::new(ErrorKind::Network, Some(status), message("gateway timeout")),
        s if (400..500).contains(&s) => PlatformError {
            tag: Some("Client"),
            ..PlatformError::new(
                ErrorKind::Internal,
                Some(s),
                message(&format!("unspecified client error (status {s})")),
            )
        },
        s if (500..600).contains(&s) => PlatformError {
            tag: Some("Server"),
            ..PlatformError::new(
                ErrorKind::Internal,
                Some(s),
                message(&format!("unspecified server error (status {s})")),
            )
        },
        s => PlatformError::new(
            ErrorKind::Internal,
            Some(s),
            message(&format!("unexpected status {s}")),
        ),
    }
}

/// Classify a transport-level failure (no HTTP status reached us).
pub fn classify_transport(message: impl Into<String>) -> PlatformError {
    PlatformError::new(ErrorKind::Network, None, message)
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => classify(status.as_u16(), Some(&err.to_string())),
            None => classify_transport(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for PlatformError {
    fn from(err: anyhow::Error) -> Self {
        PlatformError::new(ErrorKind::Internal, None, err.to_string())
    }
}
