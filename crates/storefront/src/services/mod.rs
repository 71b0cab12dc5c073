//! Business logic services for storefront.
//!
//! Request-scoped services borrow their backend (`XService::new(&backend)`),
//! with the caller's access token already applied so row-level security
//! sees the right user. Long-lived pieces (`StatsCache`, `VisitorTracker`)
//! own an `Arc<dyn Backend>` and live in `AppState`.

pub mod auth;
pub mod profiles;
pub mod reviews;
pub mod shops;
pub mod stats;
pub mod tracking;

pub use auth::{AuthFlowError, AuthFlows};
pub use profiles::{ProfileError, ProfileService};
pub use reviews::{ReviewError, ReviewForm, ReviewService};
pub use shops::{ShopError, ShopForm, ShopService};
pub use stats::StatsCache;
pub use tracking::VisitorTracker;
