//! Authentication extractors.
//!
//! The public API is stateless: callers send `Authorization: Bearer <access
//! token>` from the auth service and the token is resolved to its user on
//! every request.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::SecretString;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.id())
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that resolves the caller if a token is present.
///
/// A missing header yields `None`; a token the auth service refuses is still
/// rejected so clients notice expired sessions.
pub struct OptionalUser(pub Option<CurrentUser>);

/// The bearer token of a request, if any.
fn bearer_token(parts: &Parts) -> Option<SecretString> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| SecretString::from(token.to_string()))
}

async fn resolve(state: &AppState, access_token: SecretString) -> Result<CurrentUser, AppError> {
    let user = state.auth().get_user(&access_token).await.map_err(|e| {
        tracing::debug!(error = %e, "Access token refused");
        AppError::Unauthorized("invalid or expired session".to_string())
    })?;
    set_sentry_user(&user.id, user.email.as_deref());
    Ok(CurrentUser { user, access_token })
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("must be signed in".to_string()))?;
        Ok(Self(resolve(state, token).await?))
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) => Ok(Self(Some(resolve(state, token).await?))),
            None => Ok(Self(None)),
        }
    }
}
