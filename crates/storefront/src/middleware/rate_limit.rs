//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Clients are keyed by IP with `SmartIpKeyExtractor`: proxy headers
//! (`x-forwarded-for`, `x-real-ip`, `forwarded`) first, then the peer
//! address. Servers using these layers must be started with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Build a per-IP limiter: one request replenished every `replenish_secs`,
/// with bursts of up to `burst`.
///
/// # Panics
///
/// Panics if either argument is zero, which `GovernorConfigBuilder` refuses.
#[must_use]
pub fn rate_limiter(replenish_secs: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish()
        .expect("rate limiter config requires non-zero period and burst");
    GovernorLayer::new(Arc::new(config))
}

/// Auth endpoints: ~10 requests per minute per IP, burst of 5.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    rate_limiter(6, 5)
}
