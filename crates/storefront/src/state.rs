//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{AuthApi, Backend, GoTrueClient, RestBackend};
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::stats::STATS_TTL;
use crate::services::{StatsCache, VisitorTracker};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Every long-lived client and cache is built
/// once here and handed to handlers explicitly.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Arc<dyn Backend>,
    auth: Arc<dyn AuthApi>,
    catalog: Catalog,
    stats: Arc<StatsCache>,
    tracker: VisitorTracker,
}

impl AppState {
    /// Build the state with the REST and auth clients from `config`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = Arc::new(RestBackend::new(config.backend.clone()));
        let auth = Arc::new(GoTrueClient::new(config.backend.clone()));
        Self::with_clients(config, backend, auth)
    }

    /// Build the state around existing clients (tests use the in-memory
    /// backend for both).
    #[must_use]
    pub fn with_clients(
        config: StorefrontConfig,
        backend: Arc<dyn Backend>,
        auth: Arc<dyn AuthApi>,
    ) -> Self {
        let catalog = Catalog::new(Arc::clone(&backend));
        let stats = Arc::new(StatsCache::new(Arc::clone(&backend), STATS_TTL));
        let tracker = VisitorTracker::new(Arc::clone(&backend));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                auth,
                catalog,
                stats,
                tracker,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Backend acting with the anon key.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> &dyn AuthApi {
        self.inner.auth.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<StatsCache> {
        &self.inner.stats
    }

    #[must_use]
    pub fn tracker(&self) -> &VisitorTracker {
        &self.inner.tracker
    }
}
