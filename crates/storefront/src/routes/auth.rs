//! Authentication route handlers.
//!
//! Thin JSON wrappers around [`AuthFlows`]; the auth service's messages are
//! returned verbatim in `{"error": ...}`.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::ORIGIN},
    routing::post,
};
use serde::Deserialize;

use crate::backend::{AuthSession, AuthUser, OtpType, SignUpOutcome};
use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireUser;
use crate::services::AuthFlows;
use crate::state::AppState;

/// Build the auth router, mounted under `/api/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/signout", post(sign_out))
        .route("/recover", post(recover))
        .route("/password", post(change_password))
        .route("/verify", post(verify))
}

fn flows(state: &AppState) -> AuthFlows<'_> {
    AuthFlows::new(state.auth(), state.config().site_url.as_deref())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoverRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
    pub confirmation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub token_hash: String,
    #[serde(rename = "type")]
    pub kind: OtpType,
}

/// Create an account. Without a session in the response the user must
/// confirm their email first.
///
/// # Errors
///
/// Returns 400 for a blank name or invalid email, or the auth service's
/// rejection.
pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpOutcome>)> {
    let outcome = flows(&state)
        .sign_up(&body.email, &body.password, &body.full_name)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// # Errors
///
/// Returns the auth service's rejection (e.g. invalid credentials).
pub async fn sign_in(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignInRequest>,
) -> Result<Json<AuthSession>> {
    Ok(Json(flows(&state).sign_in(&body.email, &body.password).await?))
}

/// # Errors
///
/// Returns 401 without a valid session.
pub async fn sign_out(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<StatusCode> {
    flows(&state).sign_out(&user.access_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Send a password recovery email. The link points at `SITE_URL` (or the
/// request's `Origin`) `/reset-password`.
///
/// # Errors
///
/// Returns an error if the auth service refuses or no base URL is known.
pub async fn recover(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<RecoverRequest>,
) -> Result<StatusCode> {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    flows(&state).recover(&body.email, origin).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Set a new password for the caller.
///
/// # Errors
///
/// Returns 400 for a short or unconfirmed password and 401 without a session.
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<PasswordRequest>,
) -> Result<Json<AuthUser>> {
    let updated = flows(&state)
        .change_password(&user.access_token, &body.password, &body.confirmation)
        .await?;
    Ok(Json(updated))
}

/// Exchange an emailed token for a session.
///
/// # Errors
///
/// Returns the auth service's rejection for expired or invalid tokens.
pub async fn verify(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyRequest>,
) -> Result<Json<AuthSession>> {
    Ok(Json(flows(&state).verify_otp(&body.token_hash, body.kind).await?))
}
