//! Create-then-poll orchestration for remote translation tasks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::api::{RemoteClient, TaskStatus, TranslationRequest};
use crate::error::RemoteError;
use crate::transport::Sleeper;
use crate::transport::constants::DEFAULT_POLL_INTERVAL;

/// Generic failure text used when the server reports `failed` without an error.
const GENERIC_FAILURE: &str = "translation failed";

/// Progress callback: `(progress fraction, most recent log line)`.
pub type ProgressCallback<'a> = &'a mut (dyn FnMut(f64, &str) + Send);

/// Drives a task to a terminal status by fetching it at a fixed interval.
///
/// By default the loop is unbounded; callers wanting a deadline set
/// [`with_max_polls`](Self::with_max_polls) or wrap the call in a timeout.
#[derive(Debug, Clone)]
pub struct TaskPoller<'a> {
    client: &'a RemoteClient,
    interval: Duration,
    max_polls: Option<u32>,
    sleeper: Arc<dyn Sleeper>,
}

impl<'a> TaskPoller<'a> {
    /// Creates a poller using the client's sleeper and a 500ms interval.
    #[must_use]
    pub fn new(client: &'a RemoteClient) -> Self {
        Self {
            client,
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
            sleeper: client.transport().sleeper(),
        }
    }

    /// Sets the wait between status fetches.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the number of status fetches.
    #[must_use]
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls.max(1));
        self
    }

    /// Replaces the sleeper used between fetches.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the wait between status fetches.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Creates a translation task and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns the creation error, or any error from [`wait`](Self::wait).
    pub async fn translate_and_wait(
        &self,
        request: &TranslationRequest,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<String, RemoteError> {
        let created = self.client.create_translation(request).await?;
        self.wait(&created.task_id, on_progress).await
    }

    /// Polls `task_id` until it completes and returns its result text.
    ///
    /// After every fetch the callback, if any, receives the progress fraction
    /// and the latest log line (empty before the first log).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::TaskFailed`] with the server's error text,
    /// [`RemoteError::TaskCancelled`], [`RemoteError::PollLimit`] when the
    /// bound is hit, or the status fetch error.
    #[instrument(skip(self, on_progress), fields(interval_ms = self.interval.as_millis()))]
    pub async fn wait(
        &self,
        task_id: &str,
        mut on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<String, RemoteError> {
        let mut polls = 0u32;

        loop {
            let task = self.client.task_status(task_id).await?;
            polls += 1;
            debug!(polls, status = %task.status, progress = task.progress, "polled task");

            if let Some(callback) = on_progress.as_mut() {
                callback(task.progress, task.last_log());
            }

            match task.status {
                TaskStatus::Completed => {
                    info!(polls, "task completed");
                    return Ok(task.result.unwrap_or_default());
                }
                TaskStatus::Failed => {
                    let message = task
                        .error
                        .filter(|text| !text.is_empty())
                        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                    warn!(%message, "task failed");
                    return Err(RemoteError::task_failed(task_id, message));
                }
                TaskStatus::Cancelled => {
                    warn!("task cancelled");
                    return Err(RemoteError::task_cancelled(task_id));
                }
                TaskStatus::Pending | TaskStatus::Running => {}
            }

            if self.max_polls.is_some_and(|max| polls >= max) {
                return Err(RemoteError::PollLimit {
                    task_id: task_id.to_string(),
                    polls,
                });
            }

            self.sleeper.sleep(self.interval).await;
        }
    }
}
