//! `reqwest` implementation of [`Backend`] over the PostgREST dialect.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{Backend, BackendError, Query};

/// Connection settings shared by the REST, auth and storage clients.
///
/// Implements `Debug` manually to redact the key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Service root, e.g. `https://xyz.supabase.co`
    pub url: Url,
    /// Project key sent as `apikey` (anon key for the storefront, service
    /// key for admin)
    pub api_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl BackendConfig {
    /// Absolute URL for `path` under the service root.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// `apikey` and bearer headers for a call, using the user's token when
    /// one is given and the project key otherwise.
    pub(crate) fn headers(&self, access_token: Option<&SecretString>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let key = self.api_key.expose_secret();
        if let Ok(value) = HeaderValue::from_str(key) {
            headers.insert("apikey", value);
        }
        let bearer = access_token.map_or(key, |t| t.expose_secret());
        if let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {bearer}")) {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }
}

/// Error body returned by PostgREST for refused requests.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: String,
    #[serde(default)]
    details: Option<String>,
}

/// Backend client for the hosted REST API.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestBackendInner>,
    access_token: Option<SecretString>,
}

struct RestBackendInner {
    client: reqwest::Client,
    config: BackendConfig,
}

impl RestBackend {
    /// Create a client that authenticates with the project key.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            inner: Arc::new(RestBackendInner {
                client: reqwest::Client::new(),
                config,
            }),
            access_token: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    fn table_url(&self, table: &str) -> String {
        self.inner.config.endpoint(&format!("rest/v1/{table}"))
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .headers(self.inner.config.headers(self.access_token.as_ref()))
    }
}

#[async_trait]
impl Backend for RestBackend {
    #[instrument(skip(self, query), fields(table = %query.table_name()))]
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let response = self
            .request(reqwest::Method::GET, self.table_url(query.table_name()))
            .query(&query.to_params())
            .send()
            .await?;
        read_json(response).await.map(into_rows)
    }

    #[instrument(skip(self, rows))]
    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, BackendError> {
        let response = self
            .request(reqwest::Method::POST, self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        read_json(response).await.map(into_rows)
    }

    #[instrument(skip(self, query, patch), fields(table = %query.table_name()))]
    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError> {
        let response = self
            .request(reqwest::Method::PATCH, self.table_url(query.table_name()))
            .header("Prefer", "return=representation")
            .query(&query.filter_params())
            .json(&patch)
            .send()
            .await?;
        read_json(response).await.map(into_rows)
    }

    #[instrument(skip(self, row))]
    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<Vec<Value>, BackendError> {
        let response = self
            .request(reqwest::Method::POST, self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .query(&[("on_conflict", on_conflict)])
            .json(&row)
            .send()
            .await?;
        read_json(response).await.map(into_rows)
    }

    #[instrument(skip(self, args))]
    async fn rpc(&self, function: &str, args: Value) -> Result<Value, BackendError> {
        let url = self.inner.config.endpoint(&format!("rest/v1/rpc/{function}"));
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&args)
            .send()
            .await?;
        read_json(response).await
    }

    fn with_access_token(&self, access_token: &SecretString) -> Arc<dyn Backend> {
        Arc::new(Self {
            inner: Arc::clone(&self.inner),
            access_token: Some(access_token.clone()),
        })
    }
}

/// Read a response body as JSON, mapping failures to [`BackendError`].
///
/// An empty success body (`204 No Content`, void procedures) is `Value::Null`.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(error_from_body(status, &body));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

fn error_from_body(status: reqwest::StatusCode, body: &str) -> BackendError {
    if status.is_client_error()
        && let Ok(err) = serde_json::from_str::<PostgrestError>(body)
    {
        tracing::debug!(
            status = %status,
            code = ?err.code,
            details = ?err.details,
            "Backend rejected request"
        );
        return BackendError::Rejected {
            status: status.as_u16(),
            code: err.code,
            message: err.message,
        };
    }

    tracing::error!(
        status = %status,
        body = %body.chars().take(500).collect::<String>(),
        "Backend returned non-success status"
    );
    BackendError::Api {
        status: status.as_u16(),
        message: body.chars().take(200).collect(),
    }
}

fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> BackendConfig {
        BackendConfig {
            url: Url::parse("https://abc.example.co/").unwrap(),
            api_key: SecretString::from("anon-key-value"),
        }
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            config().endpoint("/rest/v1/products"),
            "https://abc.example.co/rest/v1/products"
        );
    }

    #[test]
    fn test_headers_prefer_user_token() {
        let config = config();
        let anon = config.headers(None);
        assert_eq!(anon.get("apikey").unwrap(), "anon-key-value");
        assert_eq!(anon.get(AUTHORIZATION).unwrap(), "Bearer anon-key-value");

        let token = SecretString::from("user-jwt");
        let user = config.headers(Some(&token));
        assert_eq!(user.get("apikey").unwrap(), "anon-key-value");
        assert_eq!(user.get(AUTHORIZATION).unwrap(), "Bearer user-jwt");
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let output = format!("{:?}", config());
        assert!(output.contains("abc.example.co"));
        assert!(!output.contains("anon-key-value"));
    }

    #[test]
    fn test_client_error_with_postgrest_body_is_rejected() {
        let body = r#"{"code":"42883","message":"operator does not exist: jsonb ~~* unknown","details":null,"hint":null}"#;
        let err = error_from_body(reqwest::StatusCode::BAD_REQUEST, body);
        match err {
            BackendError::Rejected { status, code, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("42883"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_server_error_is_api() {
        let err = error_from_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, BackendError::Api { status: 502, .. }));
    }

    #[test]
    fn test_into_rows() {
        assert_eq!(into_rows(json!([{"a": 1}])).len(), 1);
        assert!(into_rows(Value::Null).is_empty());
        assert_eq!(into_rows(json!({"a": 1})).len(), 1);
    }
}
