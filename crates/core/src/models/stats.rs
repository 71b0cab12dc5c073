//! Platform-wide counters.

use serde::{Deserialize, Serialize};

/// Aggregate counters computed on demand by the `get_platform_stats` RPC.
///
/// Never stored. `Default` is the all-zero fallback served when the RPC fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    #[serde(default)]
    pub total_visitors: i64,
    #[serde(default)]
    pub total_products: i64,
    #[serde(default)]
    pub total_shops: i64,
    #[serde(default)]
    pub total_reviews: i64,
    #[serde(default)]
    pub total_users: i64,
}
