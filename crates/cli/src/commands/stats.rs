//! Platform counters as the storefront serves them.

use std::sync::Arc;

use tracing::info;

use techspec_core::PlatformStats;
use techspec_storefront::backend::RestBackend;
use techspec_storefront::services::StatsCache;
use techspec_storefront::services::stats::STATS_TTL;

use super::{CommandError, Key, backend_config};

/// Fetch and log the counters. A failed fetch logs a warning and shows
/// zeroes, like the storefront.
///
/// # Errors
///
/// Returns an error if configuration is missing.
pub async fn show() -> Result<PlatformStats, CommandError> {
    let backend = Arc::new(RestBackend::new(backend_config(Key::Anon)?));
    let stats = StatsCache::new(backend, STATS_TTL).get().await;

    info!("Platform Statistics");
    info!("===================");
    info!("Visitors: {}", stats.total_visitors);
    info!("Products: {}", stats.total_products);
    info!("Shops:    {}", stats.total_shops);
    info!("Reviews:  {}", stats.total_reviews);
    info!("Users:    {}", stats.total_users);

    Ok(stats)
}
