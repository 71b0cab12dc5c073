//! Object storage (`/storage/v1`).

use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use super::rest::read_json;
use super::{BackendConfig, BackendError};

/// Client for the hosted object store.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    config: BackendConfig,
}

impl StorageClient {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            inner: Arc::new(StorageClientInner {
                client: reqwest::Client::new(),
                config,
            }),
        }
    }

    /// Upload `bytes` to `bucket/path`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is refused or the request fails.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let url = self
            .inner
            .config
            .endpoint(&format!("storage/v1/object/{bucket}/{path}"));
        let response = self
            .inner
            .client
            .post(url)
            .headers(self.inner.config.headers(None))
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        read_json(response).await?;
        Ok(())
    }

    /// Delete objects by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let url = self
            .inner
            .config
            .endpoint(&format!("storage/v1/object/{bucket}"));
        let response = self
            .inner
            .client
            .delete(url)
            .headers(self.inner.config.headers(None))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;
        read_json(response).await?;
        Ok(())
    }

    /// Public URL of an object in a public bucket.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.inner
            .config
            .endpoint(&format!("storage/v1/object/public/{bucket}/{path}"))
    }
}
