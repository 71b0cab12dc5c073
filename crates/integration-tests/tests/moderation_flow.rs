//! Reviews and shops from storefront submission to admin decision.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use techspec_integration_tests::TestContext;

// =============================================================================
// Fixtures
// =============================================================================

fn seed_product(ctx: &TestContext, slug: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    ctx.backend.seed(
        "products",
        vec![json!({
            "id": id,
            "category_id": null,
            "name": "Pixel 9",
            "slug": slug,
            "brand": "Google",
            "model": "G9",
            "description": null,
            "specifications": {},
            "images": [],
            "release_date": null,
            "price": "799",
            "status": "active",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        })],
    );
    id
}

async fn submit_review(ctx: &TestContext, token: &str, product_id: &str, rating: i32) -> Value {
    let reply = ctx
        .storefront(
            Method::POST,
            &format!("/api/products/{product_id}/reviews"),
            Some(token),
            Some(json!({ "rating": rating, "title": "Solid", "content": "Battery lasts two days." })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_review_hidden_until_approved() {
    let ctx = TestContext::new();
    let product_id = seed_product(&ctx, "pixel-9");
    let token = ctx.sign_in("ada@example.com").await;

    let review = submit_review(&ctx, &token, &product_id, 4).await;
    assert_eq!(review["status"], "pending");
    let review_id = review["id"].as_str().unwrap().to_string();

    let public = ctx
        .storefront(Method::GET, &format!("/api/products/{product_id}/reviews"), None, None)
        .await;
    assert_eq!(public.body, json!([]));

    // Admin sees it, with the product name embedded
    let listing = ctx.admin(Method::GET, "/api/reviews", None).await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body[0]["id"], review_id.as_str());
    assert_eq!(listing.body[0]["product"]["name"], "Pixel 9");

    let decision = ctx
        .admin(
            Method::POST,
            "/api/moderate-review",
            Some(json!({ "reviewId": review_id, "status": "approved" })),
        )
        .await;
    assert_eq!(decision.status, StatusCode::OK);

    let detail = ctx.storefront(Method::GET, "/api/products/pixel-9", None, None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["review_count"], 1);
    assert_eq!(detail.body["average_rating"], 4.0);
    assert_eq!(detail.body["reviews"][0]["id"], review_id.as_str());
}

#[tokio::test]
async fn test_review_decision_is_final() {
    let ctx = TestContext::new();
    let product_id = seed_product(&ctx, "pixel-9");
    let token = ctx.sign_in("ada@example.com").await;
    let review = submit_review(&ctx, &token, &product_id, 2).await;
    let body = json!({ "reviewId": review["id"], "status": "rejected" });

    let first = ctx.admin(Method::POST, "/api/moderate-review", Some(body)).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = ctx
        .admin(
            Method::POST,
            "/api/moderate-review",
            Some(json!({ "reviewId": review["id"], "status": "approved" })),
        )
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let public = ctx
        .storefront(Method::GET, &format!("/api/products/{product_id}/reviews"), None, None)
        .await;
    assert_eq!(public.body, json!([]));
}

#[tokio::test]
async fn test_review_requires_sign_in() {
    let ctx = TestContext::new();
    let product_id = seed_product(&ctx, "pixel-9");

    let reply = ctx
        .storefront(
            Method::POST,
            &format!("/api/products/{product_id}/reviews"),
            None,
            Some(json!({ "rating": 5, "title": "Great", "content": "Great phone" })),
        )
        .await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(ctx.backend.rows("reviews").is_empty());
}

// =============================================================================
// Shops
// =============================================================================

#[tokio::test]
async fn test_shop_registration_and_approval() {
    let ctx = TestContext::new();
    let token = ctx.sign_in("owner@example.com").await;

    let registered = ctx
        .storefront(
            Method::POST,
            "/api/shops",
            Some(&token),
            Some(json!({ "name": "Gadget Hub", "website": "https://gadgethub.test" })),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);
    assert_eq!(registered.body["status"], "pending");
    assert_eq!(registered.body["slug"], "gadget-hub");
    let shop_id = registered.body["id"].clone();

    // The owner's profile now carries the shop owner role
    let profiles = ctx.backend.rows("profiles");
    assert_eq!(profiles[0]["role"], "shop_owner");

    let listing = ctx.admin(Method::GET, "/api/shops", None).await;
    assert_eq!(listing.body[0]["status"], "pending");

    let decision = ctx
        .admin(
            Method::POST,
            "/api/moderate-shop",
            Some(json!({ "shopId": shop_id, "status": "approved" })),
        )
        .await;
    assert_eq!(decision.status, StatusCode::OK);
    assert_eq!(ctx.backend.rows("shops")[0]["status"], "approved");
}

#[tokio::test]
async fn test_shop_cannot_be_suspended_from_pending() {
    let ctx = TestContext::new();
    let token = ctx.sign_in("owner@example.com").await;
    let registered = ctx
        .storefront(Method::POST, "/api/shops", Some(&token), Some(json!({ "name": "Gadget Hub" })))
        .await;

    let decision = ctx
        .admin(
            Method::POST,
            "/api/moderate-shop",
            Some(json!({ "shopId": registered.body["id"], "status": "suspended" })),
        )
        .await;

    assert_eq!(decision.status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.backend.rows("shops")[0]["status"], "pending");
}
