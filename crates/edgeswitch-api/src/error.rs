use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::response::Body;

/// Which leg of the ping tool failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingPhase {
    /// `POST tools/ping/start`
    Start,
    /// `POST tools/ping/stop`
    Stop,
    /// `GET tools/ping` (result retrieval)
    Fetch,
}

impl fmt::Display for PingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Fetch => "fetch results",
        })
    }
}

/// Top-level error type for the `edgeswitch-api` crate.
///
/// Every switch operation returns `Result<_, Error>`. Failure variants keep
/// the device's payload (body, `message`, `detail`) so callers can decide
/// how to report it.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the login response carried no token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Request ─────────────────────────────────────────────────────
    /// The switch answered with a non-200 status.
    ///
    /// `message` is the JSON body's `message` field when present.
    #[error("Request failed (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Request {
        status: StatusCode,
        message: Option<String>,
        body: Body,
    },

    /// A command was accepted over HTTP but the device reported a
    /// `statusCode` other than 200.
    #[error("Command rejected (status code {}): {detail}", fmt_status_code(*status_code))]
    CommandRejected {
        status_code: Option<i64>,
        detail: String,
    },

    // ── Long-running operations ─────────────────────────────────────
    /// Transfer phase of an upgrade/restore was rejected by the device.
    #[error("Upload rejected (status code {}): {detail}", fmt_status_code(*status_code))]
    UploadRejected {
        status_code: Option<i64>,
        detail: String,
    },

    /// The status endpoint never reported `finished`.
    #[error("{operation} did not finish after {attempts} status checks")]
    PollTimeout {
        operation: &'static str,
        attempts: u32,
    },

    /// Ping tool failure, tagged with the phase that failed.
    #[error("Ping {phase} failed: {source}")]
    Ping {
        phase: PingPhase,
        #[source]
        source: Box<Error>,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header value could not be encoded (e.g. a token with control characters).
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// Request payload could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Local file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns `true` if this error means the credentials or token were refused.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Request { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::PollTimeout { .. } => true,
            Self::Ping { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// The device payload carried by a failed request, if any.
    pub fn body(&self) -> Option<&Body> {
        match self {
            Self::Request { body, .. } => Some(body),
            Self::Ping { source, .. } => source.body(),
            _ => None,
        }
    }

    /// HTTP status of a failed request, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::Ping { source, .. } => source.status(),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// `statusCode` for display; `None` when the reply carried none.
fn fmt_status_code(code: Option<i64>) -> String {
    code.map_or_else(|| "missing".into(), |c| c.to_string())
}
