//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, in-memory, visitor id only)
//! 5. Rate limiting on auth endpoints (governor)
//!
//! Authentication is per handler through the [`RequireUser`] and
//! [`OptionalUser`] extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{OptionalUser, RequireUser};
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter, rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{create_session_layer, visitor_id};
