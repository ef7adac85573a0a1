//! Contract between the session engine and the back office API.
//!
//! The engine never talks HTTP directly; it calls an [`AuthGateway`]. Liveness is
//! a plain boolean (an unreachable server is an ordinary answer, not an error),
//! while the other operations report why they failed so the session manager can
//! tell an outage from a rejected credential.

pub mod http;

pub use self::http::HttpGateway;

use crate::auth::types::{AccessProfile, AdminIdentity};
use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

/// Result of a successful credential exchange.
#[derive(Clone, Debug)]
pub struct LoginGrant {
    pub identity: AdminIdentity,
    pub token: SecretString,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Unable to reach the server: {0}")]
    Unreachable(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired session token")]
    InvalidToken,
    #[error("Not found")]
    NotFound,
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Whether the failure means the server could not be contacted at all.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GatewayError::Unreachable(_))
    }
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Liveness probe. Must return `false` instead of failing when the server
    /// cannot be contacted.
    async fn check_health(&self) -> bool;

    async fn login(&self, email: &str, secret: &SecretString) -> Result<LoginGrant, GatewayError>;

    async fn validate_token(&self, token: &SecretString) -> Result<AdminIdentity, GatewayError>;

    async fn fetch_profile(&self, profile_ref: &str) -> Result<AccessProfile, GatewayError>;

    /// Invalidate `token` server-side. Callers treat failures as advisory.
    async fn logout(&self, token: &SecretString) -> Result<(), GatewayError>;
}
