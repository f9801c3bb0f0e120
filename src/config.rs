//! Connection profile for a remote Murasaki server.
//!
//! A [`ConnectionProfile`] is immutable once built and is shared read-only by
//! every operation of one client.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::RemoteError;
use crate::transport::constants::DEFAULT_TIMEOUT_MS;

/// Environment variable holding the server base address.
pub const ENV_SERVER_URL: &str = "MURASAKI_SERVER_URL";

/// Environment variable holding the bearer credential.
pub const ENV_API_KEY: &str = "MURASAKI_API_KEY";

/// Environment variable holding the per-attempt timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "MURASAKI_TIMEOUT_MS";

/// Endpoint address, optional credential, and per-attempt timeout.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ConnectionProfile {
    /// Creates a profile for `base_url` with no credential and the default timeout.
    ///
    /// Surrounding whitespace and trailing slashes are stripped.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] if the address does not parse or
    /// is not http/https.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, RemoteError> {
        let trimmed = base_url.as_ref().trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|_| RemoteError::invalid_url(trimmed))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(RemoteError::invalid_url(trimmed));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            api_key: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        })
    }

    /// Loads a profile from `MURASAKI_SERVER_URL`, `MURASAKI_API_KEY`, and
    /// `MURASAKI_TIMEOUT_MS`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidConfig`] if the server address is unset
    /// or the timeout is not a positive integer, and
    /// [`RemoteError::InvalidUrl`] if the address is malformed.
    pub fn from_env() -> Result<Self, RemoteError> {
        let base_url = std::env::var(ENV_SERVER_URL)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| RemoteError::invalid_config(format!("{ENV_SERVER_URL} is not set")))?;
        let mut profile = Self::new(base_url)?.with_api_key(std::env::var(ENV_API_KEY).ok());
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_MS) {
            profile = profile.with_timeout_ms(parse_timeout_ms(&raw)?);
        }
        Ok(profile)
    }

    /// Sets the bearer credential. Empty or whitespace-only keys clear it.
    #[must_use]
    pub fn with_api_key<S: Into<String>>(mut self, api_key: Option<S>) -> Self {
        self.api_key = api_key
            .map(Into::<String>::into)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the per-attempt timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    /// Returns the normalized base address (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configured credential, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the per-attempt timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Joins a request path (starting with `/`) onto the base address.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Builds the event stream address for a task.
    ///
    /// The scheme is switched to ws/wss and the credential, if any, travels
    /// as a `token` query parameter since the upgrade request cannot carry a
    /// bearer header.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] if the derived address is invalid.
    pub fn stream_url(&self, task_id: &str) -> Result<Url, RemoteError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| RemoteError::invalid_url(&self.base_url))?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| RemoteError::invalid_url(&self.base_url))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RemoteError::invalid_url(&self.base_url))?;
            segments.pop_if_empty().extend(["api", "v1", "ws", task_id]);
        }
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("token", key);
        }
        Ok(url)
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_timeout_ms(raw: &str) -> Result<u64, RemoteError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(RemoteError::invalid_config(format!(
            "{ENV_TIMEOUT_MS} must be a positive integer, got {raw:?}"
        ))),
    }
}
