//! Platform stats and visit tracking.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use techspec_core::{NewVisit, PlatformStats};

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::{OptionalUser, visitor_id};
use crate::state::AppState;

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats))
        .route("/api/visits", post(record_visit))
}

/// Current platform counters (cached for 15 seconds, zeroes on error).
pub async fn stats(State(state): State<AppState>) -> Json<PlatformStats> {
    Json(state.stats().get().await)
}

/// A page view reported by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    pub page_url: String,
    #[serde(default)]
    pub referrer: String,
}

/// Record a page view for this browser session.
///
/// Answers `202 Accepted` at once; the insert runs in the background and
/// its failure is only logged.
///
/// # Errors
///
/// Returns 500 if the session store fails.
pub async fn record_visit(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    headers: HeaderMap,
    ApiJson(body): ApiJson<VisitRequest>,
) -> Result<StatusCode> {
    let session_id = visitor_id(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    state.tracker().record_in_background(NewVisit {
        session_id,
        user_id: user.map(|u| u.id()),
        page_url: body.page_url,
        referrer: body.referrer,
        user_agent,
    });
    Ok(StatusCode::ACCEPTED)
}
