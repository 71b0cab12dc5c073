//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                              - Health check
//!
//! # Catalog
//! GET   /api/categories                      - Categories by name
//! GET   /api/products                        - Filtered product listing
//! GET   /api/products/{slug}                 - Product detail with reviews and offers
//! GET   /api/products/{id}/reviews           - Approved reviews
//! POST  /api/products/{id}/reviews           - Submit a review (auth)
//! GET   /api/compare?ids=a,b                 - Side-by-side comparison (max 4)
//!
//! # Reviews
//! GET   /api/reviews/{id}/vote               - Caller's vote
//! POST  /api/reviews/{id}/vote               - Vote helpful / not helpful (auth)
//!
//! # Shops and account (auth)
//! POST  /api/shops                           - Register a shop
//! GET   /api/profile                         - Caller's profile
//! PATCH /api/profile                         - Update profile
//!
//! # Auth (rate limited)
//! POST  /api/auth/signup                     - Create account
//! POST  /api/auth/signin                     - Password sign-in
//! POST  /api/auth/signout                    - End session (auth)
//! POST  /api/auth/recover                    - Send recovery email
//! POST  /api/auth/password                   - Set new password (auth)
//! POST  /api/auth/verify                     - Exchange emailed token
//!
//! # Analytics
//! GET   /api/stats                           - Platform counters
//! POST  /api/visits                          - Record a page view
//! ```

pub mod account;
pub mod analytics;
pub mod auth;
pub mod products;
pub mod reviews;
pub mod shops;

use axum::{Router, extract::Request, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::middleware::{RateLimiterLayer, create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create all API routes for the storefront.
pub fn routes(auth_layer: Option<RateLimiterLayer>) -> Router<AppState> {
    let auth_routes = match auth_layer {
        Some(layer) => auth::router().layer(layer),
        None => auth::router(),
    };

    Router::new()
        .merge(products::router())
        .merge(reviews::router())
        .merge(shops::router())
        .merge(account::router())
        .merge(analytics::router())
        .nest("/api/auth", auth_routes)
}

/// The complete application: routes, session and request-id layers and
/// request tracing.
///
/// Pass `None` for `auth_layer` when the server is not bound with connect
/// info (tests).
pub fn app(state: AppState, auth_layer: Option<RateLimiterLayer>) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes(auth_layer))
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, StatusCode, header};
    use axum::response::Response;
    use secrecy::{ExposeSecret, SecretString};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use techspec_core::ReviewId;

    use crate::backend::{BackendConfig, MemoryBackend, Op};
    use crate::config::StorefrontConfig;
    use crate::middleware::REQUEST_ID_HEADER;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            backend: BackendConfig {
                url: "http://backend.test".parse().unwrap(),
                api_key: SecretString::from("anon".to_string()),
            },
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            site_url: Some("https://techspec.test".to_string()),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        }
    }

    fn test_app(backend: &MemoryBackend) -> Router {
        let state = AppState::with_clients(
            config(),
            Arc::new(backend.clone()),
            Arc::new(backend.clone()),
        );
        app(state, None)
    }

    fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        let product = |name: &str, slug: &str, price: &str| {
            json!({
                "id": techspec_core::ProductId::random(),
                "category_id": null,
                "name": name,
                "slug": slug,
                "brand": "Acme",
                "model": name,
                "description": null,
                "specifications": {"network": "5G"},
                "images": [],
                "release_date": null,
                "price": price,
                "status": "active",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
            })
        };
        backend.seed(
            "products",
            vec![
                product("Budget Phone", "budget-phone", "99"),
                product("Flagship Phone", "flagship-phone", "999"),
            ],
        );
        backend
    }

    async fn send(app: Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(test_app(&MemoryBackend::new()), Method::GET, "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_product_listing_applies_price_filter() {
        let backend = seeded();
        let response = send(test_app(&backend), Method::GET, "/api/products?minPrice=500", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Flagship Phone"]);
    }

    #[tokio::test]
    async fn test_malformed_filter_is_bad_request() {
        let backend = seeded();
        let response = send(test_app(&backend), Method::GET, "/api/products?minPrice=cheap", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let backend = seeded();
        let response = send(test_app(&backend), Method::GET, "/api/products/missing", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_compare_rejects_invalid_ids() {
        let backend = seeded();
        let response = send(test_app(&backend), Method::GET, "/api/compare?ids=abc", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.count(Op::Select, "products"), 0);
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let backend = MemoryBackend::new();
        let credentials = json!({
            "email": "ada@example.com",
            "password": "secret1",
            "fullName": "Ada Lovelace",
        });
        let response = send(test_app(&backend), Method::POST, "/api/auth/signup", None, Some(credentials)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(
            test_app(&backend),
            Method::POST,
            "/api/auth/signin",
            None,
            Some(json!({"email": "ada@example.com", "password": "secret1"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["access_token"].is_string());
    }

    #[tokio::test]
    async fn test_sign_in_failure_returns_auth_message() {
        let backend = MemoryBackend::new();
        let response = send(
            test_app(&backend),
            Method::POST,
            "/api/auth/signin",
            None,
            Some(json!({"email": "nobody@example.com", "password": "whatever"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_sign_up_requires_full_name() {
        let backend = MemoryBackend::new();
        let response = send(
            test_app(&backend),
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"email": "ada@example.com", "password": "secret1"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.count(Op::Auth, "signup"), 0);
    }

    #[tokio::test]
    async fn test_recover_links_to_reset_page() {
        let backend = MemoryBackend::new();
        let response = send(
            test_app(&backend),
            Method::POST,
            "/api/auth/recover",
            None,
            Some(json!({"email": "ada@example.com"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            backend.recoveries(),
            vec![(
                "ada@example.com".to_string(),
                "https://techspec.test/reset-password".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_vote_requires_sign_in() {
        let backend = MemoryBackend::new();
        let uri = format!("/api/reviews/{}/vote", ReviewId::random());
        let response = send(test_app(&backend), Method::POST, &uri, None, Some(json!({"isHelpful": true}))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(backend.count(Op::Upsert, "review_votes"), 0);
    }

    #[tokio::test]
    async fn test_vote_then_read_back() {
        let backend = MemoryBackend::new();
        let (_, token) = backend.create_user("ada@example.com", "secret1", "Ada");
        let token = token.expose_secret();
        let uri = format!("/api/reviews/{}/vote", ReviewId::random());

        let response = send(test_app(&backend), Method::POST, &uri, Some(token), Some(json!({"isHelpful": false}))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(test_app(&backend), Method::GET, &uri, Some(token), None).await;
        assert_eq!(json_body(response).await, json!({"isHelpful": false}));

        let response = send(test_app(&backend), Method::GET, &uri, None, None).await;
        assert_eq!(json_body(response).await, json!({"isHelpful": null}));
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let backend = MemoryBackend::new();
        let response = send(test_app(&backend), Method::GET, "/api/profile", Some("bogus"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_stats_default_to_zero_on_failure() {
        let backend = MemoryBackend::new();
        backend.fail_rpc("get_platform_stats");
        let response = send(test_app(&backend), Method::GET, "/api/stats", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["total_products"], 0);
    }

    #[tokio::test]
    async fn test_visit_is_recorded_in_background() {
        let backend = MemoryBackend::new();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/visits")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, "test-agent")
            .body(Body::from(json!({"pageUrl": "/products"}).to_string()))
            .unwrap();
        let response = test_app(&backend).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        for _ in 0..50 {
            if !backend.rows("visitor_analytics").is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let rows = backend.rows("visitor_analytics");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["page_url"], "/products");
        assert_eq!(rows[0]["user_agent"], "test-agent");
        assert!(rows[0]["user_id"].is_null());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let backend = MemoryBackend::new();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/signin")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = test_app(&backend).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }
}
