//! Review helpfulness voting.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use techspec_core::ReviewId;

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{OptionalUser, RequireUser};
use crate::services::ReviewService;
use crate::state::AppState;

/// Build the review voting router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/reviews/{review_id}/vote", get(my_vote).post(vote))
}

/// Request body for a vote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub is_helpful: bool,
}

/// The caller's vote on a review; `null` when anonymous or not voted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub is_helpful: Option<bool>,
}

/// Record or overwrite the caller's vote and recount the review.
///
/// # Errors
///
/// Returns 401 without a valid session or an error if a backend call fails.
pub async fn vote(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(review_id): ApiPath<ReviewId>,
    ApiJson(body): ApiJson<VoteRequest>,
) -> Result<StatusCode> {
    let backend = user.scoped(state.backend());
    ReviewService::new(backend.as_ref())
        .vote(Some(user.id()), review_id, body.is_helpful)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's stored vote.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn my_vote(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    ApiPath(review_id): ApiPath<ReviewId>,
) -> Result<Json<VoteResponse>> {
    let is_helpful = match &user {
        Some(user) => {
            let backend = user.scoped(state.backend());
            ReviewService::new(backend.as_ref())
                .user_vote(Some(user.id()), review_id)
                .await?
        }
        None => {
            ReviewService::new(state.backend())
                .user_vote(None, review_id)
                .await?
        }
    };
    Ok(Json(VoteResponse { is_helpful }))
}
