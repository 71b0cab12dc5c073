//! Admin listings.

use axum::{Json, Router, extract::State, routing::get};

use techspec_core::{Product, Review, Shop};

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::services::Listings;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products))
        .route("/api/shops", get(shops))
        .route("/api/reviews", get(reviews))
}

/// # Errors
///
/// Returns 401 without the admin token or 500 if the backend call fails.
pub async fn products(State(state): State<AppState>, _admin: RequireAdminToken) -> Result<Json<Vec<Product>>> {
    Ok(Json(Listings::new(state.backend()).products().await?))
}

/// # Errors
///
/// Returns 401 without the admin token or 500 if the backend call fails.
pub async fn shops(State(state): State<AppState>, _admin: RequireAdminToken) -> Result<Json<Vec<Shop>>> {
    Ok(Json(Listings::new(state.backend()).shops().await?))
}

/// Reviews of every status, with the product name embedded.
///
/// # Errors
///
/// Returns 401 without the admin token or 500 if the backend call fails.
pub async fn reviews(State(state): State<AppState>, _admin: RequireAdminToken) -> Result<Json<Vec<Review>>> {
    Ok(Json(Listings::new(state.backend()).reviews().await?))
}
