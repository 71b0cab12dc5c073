//! Session-based authentication against the hosted auth API (`/auth/v1`).
//!
//! The auth protocol itself belongs to the service; this module only makes
//! the calls and surfaces the service's messages verbatim.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use techspec_core::UserId;
use thiserror::Error;
use tracing::instrument;

use super::BackendConfig;

/// Errors from the auth API.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service refused the request; `message` is shown to the user as is.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The authenticated principal as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    /// `full_name` from the sign-up metadata, if present.
    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata.get("full_name").and_then(Value::as_str)
    }
}

/// A signed-in session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Result of a sign-up. `session` is `None` when the service requires email
/// confirmation first.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// Kind of one-time token being verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpType {
    Signup,
    Recovery,
    Email,
}

/// Auth operations the storefront needs.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Register with email and password; `full_name` is stored as user metadata.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), AuthError>;

    /// Send a password recovery email whose link lands on `redirect_to`.
    async fn recover(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    async fn update_password(
        &self,
        access_token: &SecretString,
        password: &str,
    ) -> Result<AuthUser, AuthError>;

    /// Exchange an emailed token hash for a session.
    async fn verify_otp(&self, token_hash: &str, kind: OtpType)
    -> Result<AuthSession, AuthError>;

    /// Resolve an access token to its user.
    async fn get_user(&self, access_token: &SecretString) -> Result<AuthUser, AuthError>;
}

/// Error body shapes used by the auth service.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Client for the hosted auth API.
#[derive(Clone)]
pub struct GoTrueClient {
    inner: Arc<GoTrueClientInner>,
}

struct GoTrueClientInner {
    client: reqwest::Client,
    config: BackendConfig,
}

impl GoTrueClient {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            inner: Arc::new(GoTrueClientInner {
                client: reqwest::Client::new(),
                config,
            }),
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        access_token: Option<&SecretString>,
    ) -> reqwest::RequestBuilder {
        let url = self.inner.config.endpoint(&format!("auth/v1/{path}"));
        self.inner
            .client
            .request(method, url)
            .headers(self.inner.config.headers(access_token))
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<Value, AuthError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorBody>(&body)
                .unwrap_or_default()
                .into_message()
                .unwrap_or_else(|| format!("Authentication failed ({status})"));
            tracing::debug!(status = %status, message = %message, "Auth request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AuthApi for GoTrueClient {
    #[instrument(skip(self, password, full_name))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });
        let value = Self::send(self.request(reqwest::Method::POST, "signup", None).json(&body)).await?;

        // With auto-confirm the service answers with a session, otherwise
        // with the bare (unconfirmed) user.
        if value.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(value)?;
            Ok(SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            Ok(SignUpOutcome {
                user: serde_json::from_value(value)?,
                session: None,
            })
        }
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let request = self
            .request(reqwest::Method::POST, "token", None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        Ok(serde_json::from_value(Self::send(request).await?)?)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &SecretString) -> Result<(), AuthError> {
        Self::send(self.request(reqwest::Method::POST, "logout", Some(access_token))).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn recover(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let request = self
            .request(reqwest::Method::POST, "recover", None)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }));
        Self::send(request).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn update_password(
        &self,
        access_token: &SecretString,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let request = self
            .request(reqwest::Method::PUT, "user", Some(access_token))
            .json(&json!({ "password": password }));
        Ok(serde_json::from_value(Self::send(request).await?)?)
    }

    #[instrument(skip(self, token_hash))]
    async fn verify_otp(
        &self,
        token_hash: &str,
        kind: OtpType,
    ) -> Result<AuthSession, AuthError> {
        let request = self
            .request(reqwest::Method::POST, "verify", None)
            .json(&json!({ "type": kind, "token_hash": token_hash }));
        Ok(serde_json::from_value(Self::send(request).await?)?)
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &SecretString) -> Result<AuthUser, AuthError> {
        let request = self.request(reqwest::Method::GET, "user", Some(access_token));
        Ok(serde_json::from_value(Self::send(request).await?)?)
    }
}
