//! HTTP transport with timeout enforcement and retry/backoff.
//!
//! [`Transport`] owns one pooled reqwest client and the connection profile.
//! Every attempt (send plus full body read) runs under the profile timeout;
//! failed attempts are classified and repeated according to a
//! [`RetryPolicy`].

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use super::retry::{RetryDecision, RetryPolicy, classify_failure};
use super::sleep::{Sleeper, TokioSleeper};
use crate::config::ConnectionProfile;
use crate::error::RemoteError;
use crate::user_agent;

/// Per-call request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON request body.
    pub body: Option<serde_json::Value>,
    /// Extra headers, merged over the defaults.
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Options carrying a JSON body.
    #[must_use]
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            body: Some(body),
            headers: HeaderMap::new(),
        }
    }

    /// Adds a header to the request.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Retrying, timeout-bounded HTTP transport bound to one server.
///
/// Cloning is cheap; clones share the connection pool, profile, and sleeper.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    profile: Arc<ConnectionProfile>,
    sleeper: Arc<dyn Sleeper>,
}

impl Transport {
    /// Creates a transport for `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(profile: ConnectionProfile) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| RemoteError::ClientBuild { source })?;
        Ok(Self {
            client,
            profile: Arc::new(profile),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replaces the sleeper used between retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the connection profile.
    #[must_use]
    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// Returns the sleeper shared with the task poller.
    #[must_use]
    pub fn sleeper(&self) -> Arc<dyn Sleeper> {
        Arc::clone(&self.sleeper)
    }

    /// Performs a JSON call and decodes the response body.
    ///
    /// Without `override_retry`, only idempotent methods are retried.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::HttpStatus`], [`RemoteError::Timeout`], or
    /// [`RemoteError::Network`] when the call fails and is not retried,
    /// [`RemoteError::Exhausted`] when retries run out, and
    /// [`RemoteError::Decode`] when the body is not the expected JSON.
    #[instrument(skip(self, options), fields(method = %method))]
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
        override_retry: Option<bool>,
    ) -> Result<T, RemoteError> {
        let policy = RetryPolicy::for_method(&method, override_retry);
        let body = self
            .with_retry(path, &policy, |_| self.send(&method, path, &options))
            .await?;
        decode_json(path, &body)
    }

    /// Performs a call and returns the raw response body.
    ///
    /// # Errors
    ///
    /// Same as [`request_json`](Self::request_json), minus decoding.
    #[instrument(skip(self, policy), fields(method = %method))]
    pub async fn request_bytes(
        &self,
        method: Method,
        path: &str,
        policy: &RetryPolicy,
    ) -> Result<Bytes, RemoteError> {
        let options = RequestOptions::default();
        self.with_retry(path, policy, |_| self.send(&method, path, &options))
            .await
    }

    /// Posts `file` as a multipart form field and returns the raw response body.
    ///
    /// The form is rebuilt for each attempt; the file content is streamed
    /// from disk rather than buffered.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Io`] if the file cannot be opened, plus the
    /// errors of [`request_bytes`](Self::request_bytes).
    #[instrument(skip(self, policy), fields(file = %file.display()))]
    pub async fn upload_multipart(
        &self,
        path: &str,
        field: &str,
        file: &Path,
        policy: &RetryPolicy,
    ) -> Result<Bytes, RemoteError> {
        self.with_retry(path, policy, move |_| async move {
            let part = Part::file(file)
                .await
                .map_err(|source| RemoteError::io(file, source))?;
            let form = Form::new().part(field.to_string(), part);
            let request = self
                .authorized(self.client.post(self.profile.endpoint(path)))
                .multipart(form);
            self.execute(path, request).await
        })
        .await
    }

    /// Runs `operation` until it succeeds or `policy` says stop.
    ///
    /// Attempts are strictly sequential. An error that is not eligible for
    /// retry is returned unchanged; an eligible error on the last attempt is
    /// wrapped in [`RemoteError::Exhausted`].
    async fn with_retry<T, F, Fut>(
        &self,
        path: &str,
        policy: &RetryPolicy,
        mut operation: F,
    ) -> Result<T, RemoteError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(path, attempt, "sending request");

            let error = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match policy.should_retry(classify_failure(&error), attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    info!(
                        path,
                        attempt = next_attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying request"
                    );
                    self.sleeper.sleep(delay).await;
                }
                RetryDecision::GiveUp { reason } => {
                    debug!(path, %reason, "not retrying request");
                    return Err(error);
                }
                RetryDecision::Exhausted { attempts } => {
                    debug!(path, attempts, "retry budget exhausted");
                    return Err(RemoteError::exhausted(path, attempts, error));
                }
            }
        }
    }

    /// Builds and executes one JSON-flavoured attempt.
    async fn send(
        &self,
        method: &Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Bytes, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers.clone());

        let mut request = self
            .authorized(
                self.client
                    .request(method.clone(), self.profile.endpoint(path)),
            )
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        self.execute(path, request).await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.profile.api_key() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Sends one attempt under the profile timeout and reads the full body.
    ///
    /// Dropping the inner future on timeout aborts the in-flight request.
    async fn execute(&self, path: &str, request: RequestBuilder) -> Result<Bytes, RemoteError> {
        let bound = self.profile.timeout();
        let attempt = async {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    RemoteError::timeout(path, bound)
                } else {
                    RemoteError::network(path, &e)
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RemoteError::http_status(path, status.as_u16(), body));
            }

            response
                .bytes()
                .await
                .map_err(|e| RemoteError::network(path, &e))
        };

        tokio::time::timeout(bound, attempt)
            .await
            .map_err(|_| RemoteError::timeout(path, bound))?
    }
}

fn decode_json<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, RemoteError> {
    serde_json::from_slice(body).map_err(|e| RemoteError::decode(path, &e))
}
