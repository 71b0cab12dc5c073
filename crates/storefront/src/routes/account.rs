//! Account route handlers.
//!
//! These routes require authentication.

use axum::{Json, Router, extract::State, routing::get};

use techspec_core::{Profile, ProfileUpdate};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireUser;
use crate::services::ProfileService;
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/profile", get(show).patch(update))
}

/// The caller's profile.
///
/// # Errors
///
/// Returns 401 without a valid session and 404 if the profile row is missing.
pub async fn show(State(state): State<AppState>, RequireUser(user): RequireUser) -> Result<Json<Profile>> {
    let backend = user.scoped(state.backend());
    Ok(Json(ProfileService::new(backend.as_ref()).get(user.id()).await?))
}

/// Update name, avatar or bio. Omitted fields are left unchanged.
///
/// # Errors
///
/// Returns 401 without a valid session and 404 if the profile row is missing.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<Profile>> {
    let backend = user.scoped(state.backend());
    let profile = ProfileService::new(backend.as_ref())
        .update(user.id(), &update)
        .await?;
    Ok(Json(profile))
}
