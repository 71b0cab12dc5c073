//! Integration tests for TechSpec.
//!
//! Both applications run in-process against one shared `MemoryBackend`, so
//! a review submitted through the storefront can be moderated through the
//! admin API and read back through the storefront again.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p techspec-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `moderation_flow` - Reviews and shops from submission to decision
//! - `catalog_import` - CSV import and image upload feeding the public catalog

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use techspec_admin::config::AdminConfig;
use techspec_admin::services::MemoryImageStore;
use techspec_storefront::backend::{BackendConfig, MemoryBackend};
use techspec_storefront::config::StorefrontConfig;

/// Admin token used by every test.
pub const ADMIN_TOKEN: &str = "Vb7Kq2Zx9Lm4Tr8Wp3Ns6Hd1Fg5Jc0Ye";

/// Both apps wired to the same in-memory backend.
pub struct TestContext {
    pub backend: MemoryBackend,
    pub images: MemoryImageStore,
    pub storefront: Router,
    pub admin: Router,
}

/// Status and decoded JSON body (`Null` for empty bodies).
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

fn backend_config(key: &str) -> BackendConfig {
    BackendConfig {
        url: "http://backend.test".parse().unwrap(),
        api_key: SecretString::from(key.to_string()),
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        let backend = MemoryBackend::new();
        let images = MemoryImageStore::new();

        let storefront_config = StorefrontConfig {
            backend: backend_config("anon"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            site_url: Some("https://techspec.test".to_string()),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        };
        let storefront_state = techspec_storefront::state::AppState::with_clients(
            storefront_config,
            Arc::new(backend.clone()),
            Arc::new(backend.clone()),
        );

        let admin_config = AdminConfig {
            backend: backend_config("service"),
            api_token: SecretString::from(ADMIN_TOKEN.to_string()),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let admin_state = techspec_admin::state::AppState::with_clients(
            admin_config,
            Arc::new(backend.clone()),
            Arc::new(images.clone()),
        );

        Self {
            storefront: techspec_storefront::routes::app(storefront_state, None),
            admin: techspec_admin::routes::app(admin_state, None),
            backend,
            images,
        }
    }

    /// Call the storefront, optionally as a signed-in user.
    pub async fn storefront(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        send(self.storefront.clone(), method, uri, token, body).await
    }

    /// Call the admin API with the admin token.
    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> Reply {
        send(self.admin.clone(), method, uri, Some(ADMIN_TOKEN), body).await
    }

    /// Sign up and sign in through the storefront; returns the access token.
    pub async fn sign_in(&self, email: &str) -> String {
        let password = "correct horse";
        let reply = self
            .storefront(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({ "email": email, "password": password, "fullName": "Test User" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

        let reply = self
            .storefront(
                Method::POST,
                "/api/auth/signin",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.body["access_token"].as_str().unwrap().to_string()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

async fn send(app: Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
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

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply { status, body }
}
