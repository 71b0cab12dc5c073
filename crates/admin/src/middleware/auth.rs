//! Admin token authentication.
//!
//! Every admin endpoint requires `Authorization: Bearer <ADMIN_API_TOKEN>`.
//! The check happens in the extractor, before the handler touches the
//! backend.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires the admin bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_admin: RequireAdminToken) -> impl IntoResponse {
///     "only with the token"
/// }
/// ```
pub struct RequireAdminToken;

impl FromRequestParts<AppState> for RequireAdminToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let expected = format!("Bearer {}", state.config().api_token.expose_secret());

        if constant_time_compare(presented, &expected) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin request with bad token");
            Err(AppError::Unauthorized)
        }
    }
}

/// Compare two strings without short-circuiting on the first difference.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("Bearer abc", "Bearer abc"));
        assert!(!constant_time_compare("Bearer abd", "Bearer abc"));
        assert!(!constant_time_compare("Bearer ab", "Bearer abc"));
        assert!(!constant_time_compare("", "Bearer abc"));
    }
}
