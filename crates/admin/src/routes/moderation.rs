//! Review and shop moderation.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use techspec_core::{ReviewId, ReviewStatus, ShopId, ShopStatus};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAdminToken;
use crate::services::Moderator;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/moderate-review", post(moderate_review))
        .route("/api/moderate-shop", post(moderate_shop))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateReviewRequest {
    pub review_id: ReviewId,
    pub status: ReviewStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateShopRequest {
    pub shop_id: ShopId,
    pub status: ShopStatus,
}

/// `{"ok": true}`
#[derive(Debug, Serialize)]
pub struct Acknowledged {
    pub ok: bool,
}

impl Acknowledged {
    const YES: Self = Self { ok: true };
}

/// # Errors
///
/// Returns 404 for an unknown review and 409 if it is no longer pending.
pub async fn moderate_review(
    State(state): State<AppState>,
    _admin: RequireAdminToken,
    ApiJson(body): ApiJson<ModerateReviewRequest>,
) -> Result<Json<Acknowledged>> {
    Moderator::new(state.backend())
        .review(body.review_id, body.status)
        .await?;
    Ok(Json(Acknowledged::YES))
}

/// # Errors
///
/// Returns 404 for an unknown shop and 409 if it is no longer pending.
pub async fn moderate_shop(
    State(state): State<AppState>,
    _admin: RequireAdminToken,
    ApiJson(body): ApiJson<ModerateShopRequest>,
) -> Result<Json<Acknowledged>> {
    Moderator::new(state.backend())
        .shop(body.shop_id, body.status)
        .await?;
    Ok(Json(Acknowledged::YES))
}
