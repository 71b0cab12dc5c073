//! Platform counters with a short-lived cache.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use techspec_core::PlatformStats;

use crate::backend::{Backend, BackendError};

/// How long a fetched value is served without asking the backend again.
pub const STATS_TTL: Duration = Duration::from_secs(15);

/// How often the background refresher asks for fresh counters.
pub const STATS_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Aggregate procedure computing the counters.
pub const STATS_RPC: &str = "get_platform_stats";

/// Memoized [`PlatformStats`].
///
/// [`get`](Self::get) never fails: a backend error is logged and the zeroed
/// default is cached (for the full TTL) and returned instead.
pub struct StatsCache {
    backend: Arc<dyn Backend>,
    ttl: Duration,
    cached: Mutex<Option<(PlatformStats, Instant)>>,
}

impl StatsCache {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Current counters, from cache when younger than the TTL.
    ///
    /// Concurrent callers on a cold cache wait for the same fetch.
    pub async fn get(&self) -> PlatformStats {
        let mut cached = self.cached.lock().await;
        if let Some((stats, fetched_at)) = *cached
            && fetched_at.elapsed() < self.ttl
        {
            return stats;
        }

        let stats = match self.fetch().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch platform stats, using zeroes");
                PlatformStats::default()
            }
        };
        *cached = Some((stats, Instant::now()));
        stats
    }

    async fn fetch(&self) -> Result<PlatformStats, BackendError> {
        // Set-returning procedures answer with a one-row array.
        let value = match self.backend.rpc(STATS_RPC, json!({})).await? {
            Value::Array(rows) => rows.into_iter().next().unwrap_or(Value::Null),
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }

    /// Refresh the cache every `interval` for the life of the process.
    pub fn spawn_refresher(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let stats = self.get().await;
                tracing::debug!(?stats, "Platform stats refreshed");
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Op};

    fn cache(backend: &MemoryBackend) -> StatsCache {
        StatsCache::new(Arc::new(backend.clone()), STATS_TTL)
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_calls_within_ttl_hit_backend_once() {
        let backend = MemoryBackend::new();
        backend.seed("products", vec![json!({"id": "p1"})]);
        let stats = cache(&backend);

        let first = stats.get().await;
        tokio::time::advance(Duration::from_secs(14)).await;
        let second = stats.get().await;

        assert_eq!(first, second);
        assert_eq!(first.total_products, 1);
        assert_eq!(backend.count(Op::Rpc, STATS_RPC), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_ttl() {
        let backend = MemoryBackend::new();
        let stats = cache(&backend);

        assert_eq!(stats.get().await.total_products, 0);
        backend.seed("products", vec![json!({"id": "p1"})]);
        tokio::time::advance(STATS_TTL).await;

        assert_eq!(stats.get().await.total_products, 1);
        assert_eq!(backend.count(Op::Rpc, STATS_RPC), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_caches_zeroed_default() {
        let backend = MemoryBackend::new();
        backend.seed("products", vec![json!({"id": "p1"})]);
        backend.fail_rpc(STATS_RPC);
        let stats = cache(&backend);

        assert_eq!(stats.get().await, PlatformStats::default());
        assert_eq!(stats.get().await, PlatformStats::default());
        assert_eq!(backend.count(Op::Rpc, STATS_RPC), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresher_polls() {
        let backend = MemoryBackend::new();
        let stats = Arc::new(cache(&backend));
        let handle = Arc::clone(&stats).spawn_refresher(STATS_POLL_INTERVAL);

        // First tick fires immediately, the next one a poll interval later.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(backend.count(Op::Rpc, STATS_RPC), 1);
        tokio::time::sleep(STATS_POLL_INTERVAL).await;
        assert_eq!(backend.count(Op::Rpc, STATS_RPC), 2);
        handle.abort();
    }
}
