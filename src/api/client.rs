//! Typed resource operations over the transport core.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::Method;
use tracing::{debug, info, instrument};

use super::types::{
    ConnectionCheck, GlossaryInfo, HealthStatus, ModelInfo, ServerStatus, TaskCreated,
    TaskSnapshot, TranslationRequest, UploadedFile,
};
use super::wire::{
    self, WireGlossary, WireHealth, WireListing, WireMessage, WireModel, WireServerStatus,
    WireTaskCreated, WireTaskStatus, WireUpload,
};
use crate::config::ConnectionProfile;
use crate::error::RemoteError;
use crate::stream::TaskEventStream;
use crate::task::TaskPoller;
use crate::transport::{RequestOptions, RetryPolicy, Sleeper, Transport};

const HEALTH_PATH: &str = "/health";
const STATUS_PATH: &str = "/api/v1/status";
const MODELS_PATH: &str = "/api/v1/models";
const GLOSSARIES_PATH: &str = "/api/v1/glossaries";
const TRANSLATE_PATH: &str = "/api/v1/translate";
const UPLOAD_PATH: &str = "/api/v1/upload/file";
const DOWNLOAD_PATH: &str = "/api/v1/download";

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// Client for one remote Murasaki server.
///
/// Construct once per configured server and pass it to every call site.
/// Cloning is cheap and clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use murasaki_remote::{ConnectionProfile, RemoteClient, TranslationRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let profile = ConnectionProfile::new("http://gpu-box:8000")?.with_api_key(Some("key"));
/// let client = RemoteClient::new(profile)?;
/// let output = client
///     .poller()
///     .translate_and_wait(&TranslationRequest::for_text("吾輩は猫である"), None)
///     .await?;
/// println!("{output}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RemoteClient {
    transport: Transport,
}

impl RemoteClient {
    /// Creates a client for `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(profile: ConnectionProfile) -> Result<Self, RemoteError> {
        Ok(Self {
            transport: Transport::new(profile)?,
        })
    }

    /// Replaces the sleeper used for retry backoff and polling.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.transport = self.transport.with_sleeper(sleeper);
        self
    }

    /// Returns the connection profile.
    #[must_use]
    pub fn profile(&self) -> &ConnectionProfile {
        self.transport.profile()
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Probes `/health`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the probe fails.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, RemoteError> {
        let wire: WireHealth = self
            .transport
            .request_json(Method::GET, HEALTH_PATH, RequestOptions::default(), None)
            .await?;
        Ok(wire::decode_health(wire))
    }

    /// Probes `/health` and folds any failure into the returned value.
    pub async fn test_connection(&self) -> ConnectionCheck {
        match self.health().await {
            Ok(health) => ConnectionCheck {
                ok: true,
                message: format!("connected ({})", health.status),
                version: health.version,
            },
            Err(error) => {
                debug!(%error, "connection probe failed");
                ConnectionCheck {
                    ok: false,
                    message: error.to_string(),
                    version: None,
                }
            }
        }
    }

    /// Fetches server status.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error.
    #[instrument(skip(self))]
    pub async fn server_status(&self) -> Result<ServerStatus, RemoteError> {
        let wire: WireServerStatus = self
            .transport
            .request_json(Method::GET, STATUS_PATH, RequestOptions::default(), None)
            .await?;
        Ok(wire::decode_server_status(wire))
    }

    /// Lists models available on the server.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, RemoteError> {
        let wire: WireListing<WireModel> = self
            .transport
            .request_json(Method::GET, MODELS_PATH, RequestOptions::default(), None)
            .await?;
        Ok(wire::decode_models(wire))
    }

    /// Lists glossaries available on the server.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error.
    #[instrument(skip(self))]
    pub async fn list_glossaries(&self) -> Result<Vec<GlossaryInfo>, RemoteError> {
        let wire: WireListing<WireGlossary> = self
            .transport
            .request_json(Method::GET, GLOSSARIES_PATH, RequestOptions::default(), None)
            .await?;
        Ok(wire::decode_glossaries(wire))
    }

    /// Creates a translation task.
    ///
    /// Never retried: a repeated POST could start the same job twice.
    ///
    /// # Errors
    ///
    /// Returns the first failure unchanged.
    #[instrument(skip(self, request))]
    pub async fn create_translation(
        &self,
        request: &TranslationRequest,
    ) -> Result<TaskCreated, RemoteError> {
        let body = serde_json::to_value(wire::encode_translation(request))
            .map_err(|e| RemoteError::decode(TRANSLATE_PATH, &e))?;
        let wire: WireTaskCreated = self
            .transport
            .request_json(
                Method::POST,
                TRANSLATE_PATH,
                RequestOptions::json(body),
                Some(false),
            )
            .await?;
        let created = wire::decode_task_created(wire);
        info!(task_id = %created.task_id, "translation task created");
        Ok(created)
    }

    /// Fetches the current snapshot of a task.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error.
    #[instrument(skip(self))]
    pub async fn task_status(&self, task_id: &str) -> Result<TaskSnapshot, RemoteError> {
        let path = task_path(task_id);
        let wire: WireTaskStatus = self
            .transport
            .request_json(Method::GET, &path, RequestOptions::default(), None)
            .await?;
        Ok(wire::decode_task(wire))
    }

    /// Asks the server to cancel a task and returns its acknowledgement message.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error.
    #[instrument(skip(self))]
    pub async fn cancel_task(&self, task_id: &str) -> Result<String, RemoteError> {
        let path = task_path(task_id);
        let wire: WireMessage = self
            .transport
            .request_json(Method::DELETE, &path, RequestOptions::default(), None)
            .await?;
        Ok(wire.message)
    }

    /// Uploads a local file for later translation.
    ///
    /// Two attempts, retried only on transient network errors.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Io`] if the file cannot be read, otherwise the
    /// transport or decode error.
    #[instrument(skip(self), fields(file = %file.display()))]
    pub async fn upload_file(&self, file: &Path) -> Result<UploadedFile, RemoteError> {
        let body = self
            .transport
            .upload_multipart(UPLOAD_PATH, UPLOAD_FIELD, file, &RetryPolicy::upload())
            .await?;
        let wire: WireUpload =
            serde_json::from_slice(&body).map_err(|e| RemoteError::decode(UPLOAD_PATH, &e))?;
        Ok(wire::decode_upload(wire))
    }

    /// Downloads a finished task's output as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn download_result(&self, task_id: &str) -> Result<Bytes, RemoteError> {
        let path = format!("{DOWNLOAD_PATH}/{}", encode_segment(task_id));
        self.transport
            .request_bytes(Method::GET, &path, &RetryPolicy::download())
            .await
    }

    /// Opens the event stream for a task.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::WebSocket`] if the connection cannot be opened.
    pub async fn subscribe(&self, task_id: &str) -> Result<TaskEventStream, RemoteError> {
        TaskEventStream::connect(self.profile(), task_id).await
    }

    /// Returns a poller bound to this client.
    #[must_use]
    pub fn poller(&self) -> TaskPoller<'_> {
        TaskPoller::new(self)
    }
}

fn task_path(task_id: &str) -> String {
    format!("{TRANSLATE_PATH}/{}", encode_segment(task_id))
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
