//! Event frames received on a task stream.

use serde::Deserialize;
use tracing::warn;

use crate::api::TaskStatus;
use crate::error::RemoteError;

/// A decoded event from a task stream.
#[derive(Debug)]
pub enum TaskEvent {
    /// A log line emitted by the server.
    Log(String),

    /// Progress update.
    Progress {
        /// Progress fraction in `[0, 1]`.
        progress: f64,
        /// Blocks translated so far.
        current_block: u32,
        /// Total blocks.
        total_blocks: u32,
    },

    /// Terminal event; the stream closes right after delivering it.
    Complete {
        /// Final task status.
        status: TaskStatus,
        /// Translated output, if any.
        result: Option<String>,
        /// Failure text, if any.
        error: Option<String>,
    },

    /// A malformed frame or a connection failure.
    ///
    /// Decode errors leave the stream open; connection errors end it.
    Error(RemoteError),
}

impl TaskEvent {
    /// Returns true for [`TaskEvent::Complete`].
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireFrame {
    Log {
        #[serde(default)]
        message: String,
    },
    Progress {
        #[serde(default)]
        progress: f64,
        #[serde(default)]
        current_block: u32,
        #[serde(default)]
        total_blocks: u32,
    },
    Complete {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// Just the discriminant, for frames whose payload does not decode.
#[derive(Debug, Deserialize)]
struct FrameKind {
    #[serde(rename = "type")]
    kind: String,
}

/// Decodes one text frame.
///
/// Returns `Ok(None)` for well-formed frames of a type this client does not
/// handle. A `complete` frame always yields a terminal event, even when its
/// payload is off-contract.
///
/// # Errors
///
/// Returns [`RemoteError::StreamDecode`] when the payload is not a valid frame.
pub fn decode_frame(text: &str) -> Result<Option<TaskEvent>, RemoteError> {
    let frame: WireFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) if is_completion(text) => {
            warn!(error = %e, "completion frame has an invalid payload");
            return Ok(Some(TaskEvent::Complete {
                status: TaskStatus::Failed,
                result: None,
                error: Some(format!("malformed completion frame: {e}")),
            }));
        }
        Err(e) => return Err(RemoteError::stream_decode(e.to_string())),
    };
    Ok(match frame {
        WireFrame::Log { message } => Some(TaskEvent::Log(message)),
        WireFrame::Progress {
            progress,
            current_block,
            total_blocks,
        } => Some(TaskEvent::Progress {
            progress,
            current_block,
            total_blocks,
        }),
        WireFrame::Complete {
            status,
            result,
            error,
        } => Some(completion(status.as_deref(), result, error)),
        WireFrame::Unknown => None,
    })
}

/// A `complete` frame always ends the stream. An unrecognized or missing
/// status is reported as a failure, keeping the server's error text if any.
fn completion(status: Option<&str>, result: Option<String>, error: Option<String>) -> TaskEvent {
    if let Some(status) = status.and_then(TaskStatus::parse) {
        return TaskEvent::Complete {
            status,
            result,
            error,
        };
    }
    let raw = status.unwrap_or("<missing>");
    warn!(status = raw, "completion frame has an unrecognized status");
    TaskEvent::Complete {
        status: TaskStatus::Failed,
        result,
        error: error
            .filter(|text| !text.is_empty())
            .or_else(|| Some(format!("unrecognized completion status: {raw}"))),
    }
}

fn is_completion(text: &str) -> bool {
    serde_json::from_str::<FrameKind>(text).is_ok_and(|frame| frame.kind == "complete")
}
