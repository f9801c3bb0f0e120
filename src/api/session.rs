//! Owner-managed slot for the active [`RemoteClient`].
//!
//! Applications that switch between local and remote execution hold one
//! [`RemoteSession`] and reconfigure or clear it explicitly, instead of
//! reaching for a process-wide client.

use tracing::info;

use super::client::RemoteClient;
use crate::config::ConnectionProfile;
use crate::error::RemoteError;

/// Holds at most one configured [`RemoteClient`].
#[derive(Debug, Default)]
pub struct RemoteSession {
    client: Option<RemoteClient>,
}

impl RemoteSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a client for `profile`, replacing any previous one.
    ///
    /// On error the previous client is left in place.
    ///
    /// # Errors
    ///
    /// Returns the client construction error.
    pub fn configure(&mut self, profile: ConnectionProfile) -> Result<&RemoteClient, RemoteError> {
        let client = RemoteClient::new(profile)?;
        info!(server = client.profile().base_url(), "remote client configured");
        Ok(&*self.client.insert(client))
    }

    /// Returns the configured client, if any.
    #[must_use]
    pub fn client(&self) -> Option<&RemoteClient> {
        self.client.as_ref()
    }

    /// Returns the configured client or an error naming the missing setup.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidConfig`] when no client is configured.
    pub fn require(&self) -> Result<&RemoteClient, RemoteError> {
        self.client
            .as_ref()
            .ok_or_else(|| RemoteError::invalid_config("remote client is not configured"))
    }

    /// Drops the configured client, returning it if there was one.
    pub fn clear(&mut self) -> Option<RemoteClient> {
        let previous = self.client.take();
        if previous.is_some() {
            info!("remote client cleared");
        }
        previous
    }

    /// Returns true if a client is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}
