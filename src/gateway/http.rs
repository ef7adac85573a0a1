//! HTTP implementation of [`AuthGateway`] for the back office REST API.
//!
//! Every request carries the crate user agent and a per-request timeout so a
//! stalled server turns into `Unreachable` instead of a hung console. Error
//! bodies are trimmed and truncated before they reach any message shown to the
//! user. Tokens are sent as `Authorization: Bearer` and never logged.

use super::{AuthGateway, GatewayError, LoginGrant};
use crate::{
    auth::types::{AccessProfile, AdminIdentity},
    APP_USER_AGENT,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tracing::{debug, info_span, instrument, Instrument};
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Deserialize)]
struct LoginResponse {
    admin: AdminIdentity,
    token: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VerifyResponse {
    Wrapped { admin: AdminIdentity },
    Bare(AdminIdentity),
}

impl VerifyResponse {
    fn into_identity(self) -> AdminIdentity {
        match self {
            VerifyResponse::Wrapped { admin } | VerifyResponse::Bare(admin) => admin,
        }
    }
}

/// Validate an API base URL and strip trailing slashes.
///
/// # Errors
/// Returns an error if `raw` is not an absolute http(s) URL with a host.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| anyhow!("Error parsing URL {trimmed}: {e}"))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
    }

    if url.host().is_none() {
        return Err(anyhow!("Error parsing URL: no host specified"));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url, path.trim_start_matches('/'))
}

#[derive(Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    // token of the current session, reused for profile lookups
    bearer: Mutex<Option<SecretString>>,
}

impl HttpGateway {
    /// Build a gateway for the API at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            bearer: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    fn remember_bearer(&self, token: Option<&SecretString>) {
        let mut bearer = self.bearer.lock().unwrap_or_else(PoisonError::into_inner);
        *bearer = token.cloned();
    }

    fn with_bearer(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.bearer.lock().unwrap_or_else(PoisonError::into_inner);
        match bearer.as_ref() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    #[instrument(skip(self))]
    async fn check_health(&self) -> bool {
        let url = self.url("/health");
        let span = info_span!("gateway.health", http.method = "GET", url = %url);

        match self.client.get(&url).send().instrument(span).await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(status = %response.status(), "health check returned non-success");
                false
            }
            Err(err) => {
                debug!("health check failed: {err}");
                false
            }
        }
    }

    #[instrument(skip(self, secret))]
    async fn login(&self, email: &str, secret: &SecretString) -> Result<LoginGrant, GatewayError> {
        let url = self.url("/auth/login");
        let span = info_span!("gateway.login", http.method = "POST", url = %url);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "email": email,
                "senha": secret.expose_secret(),
            }))
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::InvalidCredentials);
        }

        let body: LoginResponse = handle_json_response(response).await?;
        let token = SecretString::from(body.token);
        self.remember_bearer(Some(&token));

        Ok(LoginGrant {
            identity: body.admin,
            token,
        })
    }

    #[instrument(skip(self, token))]
    async fn validate_token(&self, token: &SecretString) -> Result<AdminIdentity, GatewayError> {
        let url = self.url("/auth/verify");
        let span = info_span!("gateway.validate_token", http.method = "GET", url = %url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::InvalidToken);
        }

        let body: VerifyResponse = handle_json_response(response).await?;
        self.remember_bearer(Some(token));
        Ok(body.into_identity())
    }

    #[instrument(skip(self))]
    async fn fetch_profile(&self, profile_ref: &str) -> Result<AccessProfile, GatewayError> {
        let url = self.url(&format!("/perfis/{}", profile_ref.trim()));
        let span = info_span!("gateway.fetch_profile", http.method = "GET", url = %url);

        let response = self
            .with_bearer(self.client.get(&url))
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }

        handle_json_response(response).await
    }

    #[instrument(skip(self, token))]
    async fn logout(&self, token: &SecretString) -> Result<(), GatewayError> {
        let url = self.url("/auth/logout");
        let span = info_span!("gateway.logout", http.method = "POST", url = %url);

        self.remember_bearer(None);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        handle_empty_response(response).await
    }
}

fn map_request_error(err: reqwest::Error) -> GatewayError {
    if err.is_decode() {
        GatewayError::Parse(format!("Failed to decode response: {err}"))
    } else if err.is_timeout() {
        GatewayError::Unreachable("Request timed out".to_string())
    } else {
        GatewayError::Unreachable(err.to_string())
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        return Err(http_error(response).await);
    }

    let body = response.text().await.map_err(map_request_error)?;
    serde_json::from_str(&body)
        .map_err(|err| GatewayError::Parse(format!("Failed to decode response: {err}")))
}

async fn handle_empty_response(response: Response) -> Result<(), GatewayError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    GatewayError::Http {
        status,
        message: error_message(&body),
    }
}

/// Prefer the API's `message`/`error` field, fall back to the raw body.
fn error_message(body: &str) -> String {
    let extracted = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "error"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
    });

    sanitize_body(extracted.as_deref().unwrap_or(body))
}

fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
