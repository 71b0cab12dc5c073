//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans with status and latency)
//! 3. Request ID (shared with the storefront)
//! 4. Rate limiting on the CSV import route (governor)
//!
//! Authorization is per handler through [`RequireAdminToken`].

pub mod auth;

pub use auth::RequireAdminToken;
pub use techspec_storefront::middleware::{RateLimiterLayer, rate_limiter, request_id_middleware};

/// Import requests allowed in a burst per client IP.
pub const IMPORT_BURST: u32 = 3;

/// Seconds to replenish one import request.
pub const IMPORT_REPLENISH_SECS: u64 = 20;

/// Rate limiter for the CSV import endpoint.
#[must_use]
pub fn import_rate_limiter() -> RateLimiterLayer {
    rate_limiter(IMPORT_REPLENISH_SECS, IMPORT_BURST)
}
