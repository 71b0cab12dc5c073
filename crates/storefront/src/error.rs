//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Service errors convert into
//! `AppError` with `?`; validation failures become 4xx with their message,
//! backend failures are captured to Sentry and answered without details.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::backend::{AuthError, BackendError};
use crate::catalog::CatalogError;
use crate::services::{AuthFlowError, ProfileError, ReviewError, ShopError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend service call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Auth service call failed. Rejections carry a user-facing message.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Backend(e) => Self::Backend(e),
            CatalogError::NotFound(what) => Self::NotFound(what),
            e @ CatalogError::InvalidComparison(_) => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Backend(e) => Self::Backend(e),
            e @ ReviewError::NotAuthenticated => Self::Unauthorized(e.to_string()),
            e => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<ShopError> for AppError {
    fn from(err: ShopError) -> Self {
        match err {
            ShopError::Backend(e) => Self::Backend(e),
            e @ ShopError::NotAuthenticated => Self::Unauthorized(e.to_string()),
            e => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Backend(e) => Self::Backend(e),
            ProfileError::NotFound => Self::NotFound("profile".to_string()),
        }
    }
}

impl From<AuthFlowError> for AppError {
    fn from(err: AuthFlowError) -> Self {
        match err {
            AuthFlowError::Auth(e) => Self::Auth(e),
            e @ AuthFlowError::MissingRedirectBase => Self::Internal(e.to_string()),
            e => Self::BadRequest(e.to_string()),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Backend(BackendError::Rejected { status, .. })
            | Self::Auth(AuthError::Rejected { status, .. }) => {
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(StatusCode::is_client_error)
                    .unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Backend(BackendError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Backend(_) | Self::Auth(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Auth(AuthError::Rejected { message, .. }) if status.is_client_error() => {
                message.clone()
            }
            Self::Backend(BackendError::Rejected { .. }) if status.is_client_error() => {
                "Request was rejected".to_string()
            }
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Backend(_) | Self::Auth(_) => "External service error".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current request.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product pixel-9".to_string());
        assert_eq!(err.to_string(), "Not found: product pixel-9");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Backend(BackendError::Api {
                status: 503,
                message: "down".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_rejections_keep_client_status() {
        assert_eq!(
            get_status(AppError::Backend(BackendError::Rejected {
                status: 409,
                code: Some("23505".to_string()),
                message: "duplicate key".to_string(),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_domain_errors_map_to_client_errors() {
        assert_eq!(
            get_status(ReviewError::NotAuthenticated.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ShopError::MissingName.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CatalogError::InvalidComparison(7).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthFlowError::PasswordMismatch.into()),
            StatusCode::BAD_REQUEST
        );
    }
}
