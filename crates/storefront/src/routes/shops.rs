//! Shop self-registration.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use techspec_core::Shop;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireUser;
use crate::services::{ShopForm, ShopService};
use crate::state::AppState;

/// Build the shops router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/shops", post(register))
}

/// Register a shop for the caller. The shop starts `pending` and the
/// caller becomes a `shop_owner`.
///
/// # Errors
///
/// Returns 401 without a valid session, 400 for an invalid form, or the
/// backend error (the shop row may already exist if the role update failed).
pub async fn register(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(form): ApiJson<ShopForm>,
) -> Result<(StatusCode, Json<Shop>)> {
    let backend = user.scoped(state.backend());
    let shop = ShopService::new(backend.as_ref())
        .register(Some(user.id()), form)
        .await?;
    Ok((StatusCode::CREATED, Json(shop)))
}
