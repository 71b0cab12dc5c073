//! Bulk CSV product import.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::{RateLimiterLayer, RequireAdminToken};
use crate::services::{ProductImporter, RowResult};
use crate::state::AppState;

/// Build the import router, optionally behind a per-IP rate limiter.
pub fn router(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let router = Router::new().route("/api/csv-import", post(import_csv));
    match limiter {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub results: Vec<RowResult>,
}

/// Import products from CSV text. Answers 200 with one result per data row,
/// even when some rows were rejected.
///
/// # Errors
///
/// Returns 401 without the admin token and 400 for empty content or a
/// header missing a required column.
pub async fn import_csv(
    State(state): State<AppState>,
    _admin: RequireAdminToken,
    ApiJson(body): ApiJson<ImportRequest>,
) -> Result<Json<ImportResponse>> {
    let results = ProductImporter::new(state.backend())
        .import(&body.content)
        .await?;
    Ok(Json(ImportResponse { results }))
}
