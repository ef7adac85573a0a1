use thiserror::Error;

/// Failures surfaced to callers of [`crate::auth::SessionManager::login`].
///
/// Every other session operation resolves its failures internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The back office could not be reached; the session is marked as down and
    /// the caller may retry.
    #[error("The server is not available. Try again in a few moments.")]
    ServiceUnavailable,
    #[error("{0}")]
    Credentials(String),
    #[error("a login is already in progress")]
    LoginInProgress,
    #[error("the session is not initialized yet")]
    Initializing,
}

impl SessionError {
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::Credentials("Invalid credentials.".to_string())
    }
}
