//! Product reviews and helpfulness votes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, Rating, ReviewId, ReviewStatus, UserId};

/// A product review (`reviews` table).
///
/// `helpful_count` is maintained by the `update_review_helpful_count` RPC and
/// never written directly by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: Rating,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub helpful_count: i32,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Embedded when selected as `*, product:products(name)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductName>,
}

/// The product name embedded in admin review listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductName {
    pub name: String,
}

/// Insert payload for a new review. Always created `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: Rating,
    pub title: String,
    pub content: String,
    pub status: ReviewStatus,
}

/// One helpfulness vote per `(review_id, user_id)` (`review_votes` table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewVote {
    pub review_id: ReviewId,
    pub user_id: UserId,
    pub is_helpful: bool,
}
