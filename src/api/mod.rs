//! Typed resource operations for the remote translation service.
//!
//! Each operation maps one domain call onto one transport call, translating
//! between the server's snake_case wire format and the camelCase local types.
//!
//! | Operation | Endpoint | Retry |
//! |-----------|----------|-------|
//! | [`RemoteClient::health`] | `GET /health` | 3 attempts |
//! | [`RemoteClient::server_status`] | `GET /api/v1/status` | 3 attempts |
//! | [`RemoteClient::list_models`] | `GET /api/v1/models` | 3 attempts |
//! | [`RemoteClient::list_glossaries`] | `GET /api/v1/glossaries` | 3 attempts |
//! | [`RemoteClient::create_translation`] | `POST /api/v1/translate` | never |
//! | [`RemoteClient::task_status`] | `GET /api/v1/translate/{id}` | 3 attempts |
//! | [`RemoteClient::cancel_task`] | `DELETE /api/v1/translate/{id}` | 3 attempts |
//! | [`RemoteClient::upload_file`] | `POST /api/v1/upload/file` | 2 attempts, errors only |
//! | [`RemoteClient::download_result`] | `GET /api/v1/download/{id}` | 3 attempts |

mod client;
mod session;
pub mod types;
pub mod wire;

pub use client::RemoteClient;
pub use session::RemoteSession;
pub use types::{
    ConnectionCheck, GlossaryInfo, HealthStatus, ModelInfo, ServerStatus, TaskCreated,
    TaskSnapshot, TaskStatus, TranslationMode, TranslationRequest, UploadedFile,
};
