//! WebSocket bridge from a task's event stream to a typed channel.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::USER_AGENT;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, instrument, warn};

use super::frame::{TaskEvent, decode_frame};
use crate::api::TaskStatus;
use crate::config::ConnectionProfile;
use crate::error::RemoteError;
use crate::user_agent;

/// Events buffered between the socket reader and the consumer.
const EVENT_BUFFER: usize = 64;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Callback-style consumer for [`TaskEventStream::dispatch`].
///
/// Every method defaults to a no-op, so handlers implement only what they need.
pub trait TaskEventHandler: Send {
    /// A log line arrived.
    fn on_log(&mut self, _message: &str) {}

    /// A progress update arrived.
    fn on_progress(&mut self, _progress: f64, _current_block: u32, _total_blocks: u32) {}

    /// The task reached a terminal status; no further calls follow.
    fn on_complete(&mut self, _status: TaskStatus, _result: Option<&str>, _error: Option<&str>) {}

    /// A frame was malformed or the connection failed.
    fn on_error(&mut self, _error: &RemoteError) {}
}

/// Live event stream for one task.
///
/// Events arrive in server order. The stream ends after a
/// [`TaskEvent::Complete`], after the server closes the connection, or
/// after a connection error. Dropped connections are not reopened.
#[derive(Debug)]
pub struct TaskEventStream {
    task_id: String,
    events: mpsc::Receiver<TaskEvent>,
    reader: JoinHandle<()>,
}

impl TaskEventStream {
    /// Connects to the event stream of `task_id`.
    ///
    /// The connection attempt is bounded by the profile timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::WebSocket`] if the handshake fails or times out.
    #[instrument(skip(profile), fields(server = profile.base_url()))]
    pub async fn connect(profile: &ConnectionProfile, task_id: &str) -> Result<Self, RemoteError> {
        let url = profile.stream_url(task_id)?;
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| RemoteError::websocket(task_id, e.to_string()))?;
        if let Ok(agent) = HeaderValue::from_str(&user_agent::default_user_agent()) {
            request.headers_mut().insert(USER_AGENT, agent);
        }

        let (socket, _response) = tokio::time::timeout(profile.timeout(), connect_async(request))
            .await
            .map_err(|_| RemoteError::websocket(task_id, "connection timeout"))?
            .map_err(|e| RemoteError::websocket(task_id, e.to_string()))?;
        info!("event stream connected");

        let (sender, events) = mpsc::channel(EVENT_BUFFER);
        let reader = tokio::spawn(pump(socket, sender, task_id.to_string()));

        Ok(Self {
            task_id: task_id.to_string(),
            events,
            reader,
        })
    }

    /// Returns the task this stream follows.
    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Waits for the next event; `None` once the stream has ended.
    pub async fn next_event(&mut self) -> Option<TaskEvent> {
        self.events.recv().await
    }

    /// Feeds every remaining event to `handler` until the stream ends.
    pub async fn dispatch<H>(mut self, handler: &mut H)
    where
        H: TaskEventHandler + ?Sized,
    {
        while let Some(event) = self.next_event().await {
            match event {
                TaskEvent::Log(message) => handler.on_log(&message),
                TaskEvent::Progress {
                    progress,
                    current_block,
                    total_blocks,
                } => handler.on_progress(progress, current_block, total_blocks),
                TaskEvent::Complete {
                    status,
                    result,
                    error,
                } => handler.on_complete(status, result.as_deref(), error.as_deref()),
                TaskEvent::Error(error) => handler.on_error(&error),
            }
        }
    }
}

impl Drop for TaskEventStream {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Reads frames until a terminal event, a close, an error, or the consumer leaves.
async fn pump(mut socket: Socket, sender: mpsc::Sender<TaskEvent>, task_id: String) {
    while let Some(message) = socket.next().await {
        let decoded = match message {
            Ok(Message::Text(text)) => decode_frame(text.as_str()),
            Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
                Ok(text) => decode_frame(text),
                Err(e) => Err(RemoteError::stream_decode(e.to_string())),
            },
            Ok(Message::Close(frame)) => {
                debug!(task_id = %task_id, ?frame, "server closed event stream");
                return;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "event stream connection error");
                let _ = sender
                    .send(TaskEvent::Error(RemoteError::websocket(&task_id, e.to_string())))
                    .await;
                return;
            }
        };

        let event = match decoded {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(task_id = %task_id, "ignoring unknown event frame");
                continue;
            }
            Err(error) => {
                warn!(task_id = %task_id, %error, "malformed event frame");
                TaskEvent::Error(error)
            }
        };

        let terminal = event.is_terminal();
        if sender.send(event).await.is_err() {
            debug!(task_id = %task_id, "event consumer dropped; closing stream");
            let _ = socket.close(None).await;
            return;
        }
        if terminal {
            debug!(task_id = %task_id, "terminal event received; closing stream");
            let _ = socket.close(None).await;
            return;
        }
    }
}
