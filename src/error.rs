//! Error types shared by the transport core, resource operations, task
//! poller, and event stream bridge.
//!
//! Every variant carries enough context (request path, status code, response
//! body, task id) to produce a descriptive message on its own.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Message fragments that mark an error as a transient network condition.
///
/// Matched case-insensitively against the rendered error message.
const TRANSIENT_MARKERS: &[&str] = &[
    "timeout",
    "network",
    "fetch failed",
    "econnreset",
    "etimedout",
];

/// Errors produced by the remote translation client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The configured server address could not be parsed or has an unsupported scheme.
    #[error("invalid server URL: {url}")]
    InvalidUrl {
        /// The rejected address.
        url: String,
    },

    /// A configuration value (environment variable, CLI flag) is missing or malformed.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        message: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The builder error.
        #[source]
        source: reqwest::Error,
    },

    /// An attempt did not finish within the configured timeout.
    #[error("request timeout after {secs}s: {path}")]
    Timeout {
        /// Request path relative to the server address.
        path: String,
        /// The timeout bound, in seconds.
        secs: f64,
    },

    /// Transport-level failure (connection refused, reset, DNS, broken body stream).
    #[error("network error requesting {path}: {message}")]
    Network {
        /// Request path relative to the server address.
        path: String,
        /// Flattened error chain from the HTTP stack.
        message: String,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {path}: {body}")]
    HttpStatus {
        /// Request path relative to the server address.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body text (may be empty).
        body: String,
    },

    /// The response body was not the JSON shape expected for this resource.
    #[error("invalid json from {path}: {message}")]
    Decode {
        /// Request path relative to the server address.
        path: String,
        /// Parser message.
        message: String,
    },

    /// A retryable call kept failing until its attempt budget ran out.
    #[error("request to {path} failed after {attempts} attempts: {source}")]
    Exhausted {
        /// Request path relative to the server address.
        path: String,
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        source: Box<RemoteError>,
    },

    /// Local file access failed (upload source).
    #[error("IO error reading {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The remote service reported the task as failed.
    #[error("task {task_id} failed: {message}")]
    TaskFailed {
        /// Remote task identifier.
        task_id: String,
        /// Error text reported by the service, or a generic message.
        message: String,
    },

    /// The remote service reported the task as cancelled.
    #[error("task {task_id} was cancelled")]
    TaskCancelled {
        /// Remote task identifier.
        task_id: String,
    },

    /// The poller hit its configured poll bound before a terminal status.
    #[error("task {task_id} still not finished after {polls} polls")]
    PollLimit {
        /// Remote task identifier.
        task_id: String,
        /// Number of status fetches made.
        polls: u32,
    },

    /// An event stream frame could not be decoded. Non-fatal to the connection.
    #[error("malformed event frame: {message}")]
    StreamDecode {
        /// Parser message.
        message: String,
    },

    /// The event stream connection failed.
    #[error("event stream error for task {task_id}: {message}")]
    WebSocket {
        /// Remote task identifier.
        task_id: String,
        /// Error text from the WebSocket stack.
        message: String,
    },
}

impl RemoteError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a timeout error carrying the bound in seconds.
    pub fn timeout(path: impl Into<String>, bound: Duration) -> Self {
        Self::Timeout {
            path: path.into(),
            secs: bound.as_secs_f64(),
        }
    }

    /// Creates a network error from a reqwest error, flattening its source chain.
    ///
    /// reqwest hides the OS-level cause (`ECONNRESET`, `ETIMEDOUT`) in the
    /// source chain, so the chain is rendered into the message.
    pub fn network(path: impl Into<String>, source: &reqwest::Error) -> Self {
        Self::Network {
            path: path.into(),
            message: error_chain(source),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            path: path.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a JSON decode error.
    pub fn decode(path: impl Into<String>, source: &serde_json::Error) -> Self {
        Self::Decode {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Wraps the last attempt's error after the retry budget is spent.
    pub fn exhausted(path: impl Into<String>, attempts: u32, last: RemoteError) -> Self {
        Self::Exhausted {
            path: path.into(),
            attempts,
            source: Box::new(last),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a task failure error.
    pub fn task_failed(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TaskFailed {
            task_id: task_id.into(),
            message: message.into(),
        }
    }

    /// Creates a task cancellation error.
    pub fn task_cancelled(task_id: impl Into<String>) -> Self {
        Self::TaskCancelled {
            task_id: task_id.into(),
        }
    }

    /// Creates a stream decode error.
    pub fn stream_decode(message: impl Into<String>) -> Self {
        Self::StreamDecode {
            message: message.into(),
        }
    }

    /// Creates a WebSocket connection error.
    pub fn websocket(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WebSocket {
            task_id: task_id.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code if this is (or wraps) a status error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Exhausted { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns true if this error is a retry-budget exhaustion.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns true if the error names a transient network condition.
    ///
    /// Only the error's own message is inspected, never the request path or
    /// a local file name. Timeouts and network failures are always
    /// transient; status errors are decided by status code alone and local
    /// IO or decode failures are never retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::WebSocket { message, .. } => is_transient_message(message),
            _ => false,
        }
    }
}

/// Returns true if `message` contains a transient network marker (case-insensitive).
#[must_use]
pub fn is_transient_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    TRANSIENT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        current = cause.source();
    }
    rendered
}
