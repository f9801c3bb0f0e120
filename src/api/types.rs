//! Local (camelCase) representations of remote resources.
//!
//! These are the shapes handed to callers. They serialize with camelCase
//! keys; the snake_case wire contract lives in [`super::wire`].

use serde::{Deserialize, Serialize};

/// Default translation preset profile.
pub const DEFAULT_PRESET: &str = "novel";

/// Default chunk size, in characters.
pub const DEFAULT_CHUNK_SIZE: u32 = 1000;

/// Default model context window, in tokens.
pub const DEFAULT_CTX_SIZE: u32 = 8192;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Default number of parallel translation slots.
pub const DEFAULT_PARALLEL: u32 = 1;

/// Default KV cache precision.
pub const DEFAULT_KV_CACHE_TYPE: &str = "f16";

/// Lifecycle state of a remote task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Queued on the server.
    Pending,
    /// Being translated.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Cancelled before completion.
    Cancelled,
}

impl TaskStatus {
    /// Returns true for completed, failed, and cancelled.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Parses a wire status name; `None` for anything unrecognized.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document segmentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Translate the whole document in chunks.
    #[default]
    Doc,
    /// Translate line by line.
    Line,
}

/// Result of `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Service status text (typically "ok").
    pub status: String,
    /// Server version, when reported.
    pub version: Option<String>,
}

/// Outcome of a connectivity probe. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCheck {
    /// Whether the server answered the probe.
    pub ok: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Server version, when reported.
    pub version: Option<String>,
}

/// Result of `/api/v1/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    /// Service status text.
    pub status: String,
    /// Whether a model is resident.
    pub model_loaded: bool,
    /// Name of the resident model.
    pub current_model: Option<String>,
    /// Number of tasks in flight.
    pub active_tasks: u32,
}

/// A model available on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Display name.
    pub name: String,
    /// Server-side path.
    pub path: String,
    /// File size in GiB (0 when the server omits it).
    pub size_gb: f64,
}

/// A glossary available on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryInfo {
    /// Display name.
    pub name: String,
    /// Server-side path.
    pub path: String,
}

/// Parameters of a translation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    /// Inline source text.
    pub text: Option<String>,
    /// Server-side path of an uploaded source file.
    pub file_path: Option<String>,
    /// Model to use; server default when absent.
    pub model: Option<String>,
    /// Glossary to apply.
    pub glossary: Option<String>,
    /// Prompt preset profile.
    pub preset: String,
    /// Segmentation mode.
    pub mode: TranslationMode,
    /// Chunk size in characters.
    pub chunk_size: u32,
    /// Context window in tokens.
    pub ctx_size: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Layers offloaded to the GPU; server default when absent.
    pub gpu_layers: Option<i32>,
    /// Parallel translation slots.
    pub parallel: u32,
    /// KV cache precision.
    pub kv_cache_type: String,
    /// Whether to run the line-count check on output.
    pub line_check: bool,
    /// Emit traditional Chinese.
    pub traditional: bool,
    /// Keep the translation cache on the server.
    pub save_cache: bool,
}

impl Default for TranslationRequest {
    fn default() -> Self {
        Self {
            text: None,
            file_path: None,
            model: None,
            glossary: None,
            preset: DEFAULT_PRESET.to_string(),
            mode: TranslationMode::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            ctx_size: DEFAULT_CTX_SIZE,
            temperature: DEFAULT_TEMPERATURE,
            gpu_layers: None,
            parallel: DEFAULT_PARALLEL,
            kv_cache_type: DEFAULT_KV_CACHE_TYPE.to_string(),
            line_check: true,
            traditional: false,
            save_cache: false,
        }
    }
}

impl TranslationRequest {
    /// Request translating inline text with defaults.
    #[must_use]
    pub fn for_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Request translating a previously uploaded file with defaults.
    #[must_use]
    pub fn for_file(file_path: impl Into<String>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ..Self::default()
        }
    }
}

/// Acknowledgement of a created task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreated {
    /// Remote task identifier.
    pub task_id: String,
    /// Initial status.
    pub status: TaskStatus,
}

/// Snapshot of a remote task, as last reported by the server.
///
/// Snapshots are never mutated locally; fetch a new one to observe progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    /// Remote task identifier.
    pub task_id: String,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Progress fraction in `[0, 1]`.
    pub progress: f64,
    /// Blocks translated so far.
    pub current_block: u32,
    /// Total blocks.
    pub total_blocks: u32,
    /// Log lines, oldest first.
    pub logs: Vec<String>,
    /// Translated output, once completed.
    pub result: Option<String>,
    /// Failure text, once failed.
    pub error: Option<String>,
}

impl TaskSnapshot {
    /// Most recent log line, or an empty string when there are none.
    #[must_use]
    pub fn last_log(&self) -> &str {
        self.logs.last().map_or("", String::as_str)
    }
}

/// A file accepted by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Server-side file identifier.
    pub file_id: String,
    /// Server-side path, usable as [`TranslationRequest::file_path`].
    pub file_path: String,
}
