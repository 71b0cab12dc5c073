//! Catalog route handlers: categories, listings, detail, comparison and
//! product reviews.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use techspec_core::{Category, Product, ProductId, Review};

use crate::catalog::{Comparison, ProductDetail, ProductFilter};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireUser;
use crate::services::{ReviewForm, ReviewService};
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/products", get(list_products))
        .route("/api/products/{product}", get(show))
        .route(
            "/api/products/{product}/reviews",
            get(list_reviews).post(submit_review),
        )
        .route("/api/compare", get(compare))
}

/// All categories, by name.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().list_categories().await?))
}

/// Product listing, filtered by query parameters (see [`ProductFilter`]).
///
/// # Errors
///
/// Returns 400 for malformed parameters or an error if the backend call fails.
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().list_products(&filter).await?))
}

/// Product page data by slug.
///
/// # Errors
///
/// Returns 404 for an unknown slug.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<ProductDetail>> {
    Ok(Json(state.catalog().product_detail(&slug).await?))
}

/// Approved reviews of a product, newest first.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewService::new(state.backend())
        .approved_for_product(product_id)
        .await?;
    Ok(Json(reviews))
}

/// Submit a review; it stays hidden until approved.
///
/// # Errors
///
/// Returns 401 without a valid session and 400 for an invalid form.
pub async fn submit_review(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(form): ApiJson<ReviewForm>,
) -> Result<(StatusCode, Json<Review>)> {
    let backend = user.scoped(state.backend());
    let review = ReviewService::new(backend.as_ref())
        .submit(Some(user.id()), product_id, form)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Query parameters for the comparison endpoint.
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    /// Comma-separated product ids.
    pub ids: String,
}

/// Side-by-side comparison of up to four products.
///
/// # Errors
///
/// Returns 400 for malformed or too many ids and 404 if none exists.
pub async fn compare(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CompareQuery>,
) -> Result<Json<Comparison>> {
    let ids = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<ProductId>()
                .map_err(|_| AppError::BadRequest(format!("invalid product id '{id}'")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(state.catalog().compare(&ids).await?))
}
