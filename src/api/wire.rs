//! Snake_case wire contract and its mapping to local types.
//!
//! Every resource has a wire struct mirroring the server's JSON and a pure
//! `decode_*` (wire → local) or `encode_*` (local → wire) function. The
//! transport core never sees these types, so the contract can be tested in
//! isolation.
//!
//! Missing optional fields are default-filled rather than propagated as
//! nulls: absent sizes become 0, absent counters 0, absent logs empty.

use serde::{Deserialize, Serialize};

use super::types::{
    GlossaryInfo, HealthStatus, ModelInfo, ServerStatus, TaskCreated, TaskSnapshot, TaskStatus,
    TranslationMode, TranslationRequest, UploadedFile,
};

/// `GET /health` response.
#[derive(Debug, Deserialize)]
pub struct WireHealth {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// `GET /api/v1/status` response.
#[derive(Debug, Deserialize)]
pub struct WireServerStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub current_model: Option<String>,
    #[serde(default)]
    pub active_tasks: u32,
}

/// One entry of `GET /api/v1/models`. Older servers send `sizeGb`.
#[derive(Debug, Deserialize)]
pub struct WireModel {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, alias = "sizeGb")]
    pub size_gb: Option<f64>,
}

/// One entry of `GET /api/v1/glossaries`.
#[derive(Debug, Deserialize)]
pub struct WireGlossary {
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// A listing: either a bare array or an object wrapping one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireListing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "models", alias = "glossaries")]
        items: Vec<T>,
    },
}

impl<T> WireListing<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { items } => items,
        }
    }
}

/// `POST /api/v1/translate` request body.
#[derive(Debug, Serialize)]
pub struct WireTranslateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossary: Option<String>,
    pub preset: String,
    pub mode: TranslationMode,
    pub chunk_size: u32,
    pub ctx_size: u32,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_layers: Option<i32>,
    pub parallel: u32,
    pub kv_cache_type: String,
    pub line_check: bool,
    pub traditional: bool,
    pub save_cache: bool,
}

/// `POST /api/v1/translate` response.
#[derive(Debug, Deserialize)]
pub struct WireTaskCreated {
    pub task_id: String,
    pub status: TaskStatus,
}

/// `GET /api/v1/translate/{id}` response.
#[derive(Debug, Deserialize)]
pub struct WireTaskStatus {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current_block: u32,
    #[serde(default)]
    pub total_blocks: u32,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `DELETE /api/v1/translate/{id}` response.
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub message: String,
}

/// `POST /api/v1/upload/file` response.
#[derive(Debug, Deserialize)]
pub struct WireUpload {
    pub file_id: String,
    pub file_path: String,
}

pub fn decode_health(wire: WireHealth) -> HealthStatus {
    HealthStatus {
        status: wire.status,
        version: wire.version,
    }
}

pub fn decode_server_status(wire: WireServerStatus) -> ServerStatus {
    ServerStatus {
        status: wire.status,
        model_loaded: wire.model_loaded,
        current_model: wire.current_model,
        active_tasks: wire.active_tasks,
    }
}

pub fn decode_models(wire: WireListing<WireModel>) -> Vec<ModelInfo> {
    wire.into_items()
        .into_iter()
        .map(|model| ModelInfo {
            name: model.name,
            path: model.path,
            size_gb: model.size_gb.unwrap_or(0.0),
        })
        .collect()
}

pub fn decode_glossaries(wire: WireListing<WireGlossary>) -> Vec<GlossaryInfo> {
    wire.into_items()
        .into_iter()
        .map(|glossary| GlossaryInfo {
            name: glossary.name,
            path: glossary.path,
        })
        .collect()
}

pub fn encode_translation(request: &TranslationRequest) -> WireTranslateBody {
    WireTranslateBody {
        text: request.text.clone(),
        file_path: request.file_path.clone(),
        model: request.model.clone(),
        glossary: request.glossary.clone(),
        preset: request.preset.clone(),
        mode: request.mode,
        chunk_size: request.chunk_size,
        ctx_size: request.ctx_size,
        temperature: request.temperature,
        gpu_layers: request.gpu_layers,
        parallel: request.parallel,
        kv_cache_type: request.kv_cache_type.clone(),
        line_check: request.line_check,
        traditional: request.traditional,
        save_cache: request.save_cache,
    }
}

pub fn decode_task_created(wire: WireTaskCreated) -> TaskCreated {
    TaskCreated {
        task_id: wire.task_id,
        status: wire.status,
    }
}

pub fn decode_task(wire: WireTaskStatus) -> TaskSnapshot {
    TaskSnapshot {
        task_id: wire.task_id,
        status: wire.status,
        progress: wire.progress,
        current_block: wire.current_block,
        total_blocks: wire.total_blocks,
        logs: wire.logs,
        result: wire.result,
        error: wire.error,
    }
}

pub fn decode_upload(wire: WireUpload) -> UploadedFile {
    UploadedFile {
        file_id: wire.file_id,
        file_path: wire.file_path,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_models_accepts_both_size_spellings() {
        let wire: WireListing<WireModel> = serde_json::from_value(json!([
            {"name": "a", "path": "/m/a.gguf", "size_gb": 7.5},
            {"name": "b", "path": "/m/b.gguf", "sizeGb": 4.0},
            {"name": "c", "path": "/m/c.gguf"}
        ]))
        .unwrap();
        let models = decode_models(wire);
        assert_eq!(models.len(), 3);
        assert!((models[0].size_gb - 7.5).abs() < f64::EPSILON);
        assert!((models[1].size_gb - 4.0).abs() < f64::EPSILON);
        assert!(models[2].size_gb.abs() < f64::EPSILON, "missing size defaults to 0");
    }

    #[test]
    fn test_decode_wrapped_listing() {
        let wire: WireListing<WireGlossary> =
            serde_json::from_value(json!({"glossaries": [{"name": "g", "path": "/g.json"}]}))
                .unwrap();
        let glossaries = decode_glossaries(wire);
        assert_eq!(
            glossaries,
            vec![GlossaryInfo {
                name: "g".to_string(),
                path: "/g.json".to_string()
            }]
        );
    }

    #[test]
    fn test_decode_task_fills_missing_fields() {
        let wire: WireTaskStatus =
            serde_json::from_value(json!({"task_id": "t9", "status": "pending"})).unwrap();
        let task = decode_task(wire);
        assert_eq!(task.task_id, "t9");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.current_block, 0);
        assert!(task.logs.is_empty());
        assert!(task.result.is_none());
    }

    #[test]
    fn test_decode_task_full_payload() {
        let wire: WireTaskStatus = serde_json::from_value(json!({
            "task_id": "t1",
            "status": "completed",
            "progress": 1.0,
            "current_block": 3,
            "total_blocks": 3,
            "logs": ["start", "done"],
            "result": "hello"
        }))
        .unwrap();
        let task = decode_task(wire);
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.total_blocks, 3);
        assert_eq!(task.result.as_deref(), Some("hello"));
        assert_eq!(task.last_log(), "done");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: Result<WireTaskStatus, _> =
            serde_json::from_value(json!({"task_id": "t1", "status": "exploded"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_translation_uses_snake_case_and_defaults() {
        let mut request = TranslationRequest::for_file("/uploads/a.txt");
        request.glossary = Some("names".to_string());
        let body = serde_json::to_value(encode_translation(&request)).unwrap();
        assert_eq!(body["file_path"], "/uploads/a.txt");
        assert_eq!(body["glossary"], "names");
        assert_eq!(body["preset"], "novel");
        assert_eq!(body["mode"], "doc");
        assert_eq!(body["chunk_size"], 1000);
        assert_eq!(body["ctx_size"], 8192);
        assert_eq!(body["parallel"], 1);
        assert_eq!(body["kv_cache_type"], "f16");
        assert_eq!(body["line_check"], true);
        assert!(body.get("text").is_none(), "absent options are omitted");
        assert!(body.get("filePath").is_none());
    }
}
