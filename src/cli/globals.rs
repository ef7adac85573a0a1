use crate::{
    auth::{SessionConfig, SessionManager},
    gateway::HttpGateway,
    storage::{default_token_path, FileTokenStore},
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::debug;

/// Settings shared by every subcommand that talks to the back office.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub token_file: PathBuf,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            token_file: default_token_path(),
            poll_interval: crate::auth::config::DEFAULT_POLL_INTERVAL,
            timeout: crate::gateway::http::DEFAULT_TIMEOUT,
        }
    }

    /// Wire the HTTP gateway and file token store into a session manager.
    ///
    /// # Errors
    /// Returns an error if the API URL is invalid or the HTTP client cannot be built.
    pub fn build_session(&self) -> Result<SessionManager> {
        let gateway = HttpGateway::new(&self.api_url, self.timeout)
            .with_context(|| format!("invalid API URL: {}", self.api_url))?;
        let store = FileTokenStore::new(&self.token_file);

        debug!(
            api_url = gateway.base_url(),
            token_file = %self.token_file.display(),
            "session wiring"
        );

        let config = SessionConfig::new().with_poll_interval(self.poll_interval);

        Ok(SessionManager::new(
            Arc::new(gateway),
            Arc::new(store),
            config,
        ))
    }
}
