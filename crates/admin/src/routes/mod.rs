//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                              - Health check (no token)
//!
//! # Catalog maintenance (token)
//! POST  /api/csv-import                      - Bulk product import (rate limited)
//! POST  /api/products/{id}/images            - Upload a product image
//!
//! # Moderation (token)
//! POST  /api/moderate-review                 - Approve or reject a review
//! POST  /api/moderate-shop                   - Approve or reject a shop
//!
//! # Listings (token)
//! GET   /api/products                        - Every product, newest first
//! GET   /api/shops                           - Every shop, newest first
//! GET   /api/reviews                         - Every review with product name
//! ```

pub mod images;
pub mod import;
pub mod listings;
pub mod moderation;

use axum::{
    Router,
    extract::Request,
    http::Response,
    middleware::from_fn,
    routing::get,
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{RateLimiterLayer, request_id_middleware};
use crate::state::AppState;

/// Create all token-protected admin routes.
pub fn routes(import_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    Router::new()
        .merge(import::router(import_limiter))
        .merge(images::router())
        .merge(moderation::router())
        .merge(listings::router())
}

/// The complete admin application with request-id and tracing layers.
///
/// Pass `None` for `import_limiter` when the server is not bound with
/// connect info (tests).
pub fn app(state: AppState, import_limiter: Option<RateLimiterLayer>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes(import_limiter))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}
