//! Application state shared across handlers.

use std::sync::Arc;

use techspec_storefront::backend::{Backend, RestBackend, StorageClient};

use crate::config::AdminConfig;
use crate::services::ImageStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Both clients act with the service key.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: Arc<dyn Backend>,
    images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Build the state with REST and storage clients from `config`.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let backend = Arc::new(RestBackend::new(config.backend.clone()));
        let images = Arc::new(StorageClient::new(config.backend.clone()));
        Self::with_clients(config, backend, images)
    }

    /// Build the state around existing clients.
    #[must_use]
    pub fn with_clients(
        config: AdminConfig,
        backend: Arc<dyn Backend>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                images,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.inner.images.as_ref()
    }
}
