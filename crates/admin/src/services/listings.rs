//! Newest-first admin listings of every row regardless of status.

use techspec_core::{Product, Review, Shop};
use techspec_storefront::backend::{Backend, BackendError, Direction, Query, fetch_all};

/// Reviews with the reviewed product's name embedded.
pub const REVIEW_LISTING_SELECT: &str = "*, product:products(name)";

fn newest_first(table: &str, select: &str) -> Query {
    Query::table(table)
        .select(select)
        .order("created_at", Direction::Desc)
}

pub struct Listings<'a> {
    backend: &'a dyn Backend,
}

impl<'a> Listings<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn products(&self) -> Result<Vec<Product>, BackendError> {
        fetch_all(self.backend, &newest_first("products", "*")).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn shops(&self) -> Result<Vec<Shop>, BackendError> {
        fetch_all(self.backend, &newest_first("shops", "*")).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn reviews(&self) -> Result<Vec<Review>, BackendError> {
        fetch_all(self.backend, &newest_first("reviews", REVIEW_LISTING_SELECT)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;
    use techspec_core::{ProductId, ReviewStatus, UserId};
    use techspec_storefront::backend::MemoryBackend;

    fn review(product_id: ProductId, status: &str, created: &str) -> serde_json::Value {
        json!({
            "id": uuid::Uuid::new_v4(),
            "product_id": product_id,
            "user_id": UserId::random(),
            "rating": 4,
            "title": "Solid",
            "content": "Works well",
            "helpful_count": 0,
            "status": status,
            "created_at": created,
            "updated_at": created,
        })
    }

    #[tokio::test]
    async fn test_reviews_newest_first_with_product_name() {
        let backend = MemoryBackend::new();
        let product_id = ProductId::random();
        backend.seed("products", vec![json!({"id": product_id, "name": "Pixel 9"})]);
        backend.seed(
            "reviews",
            vec![
                review(product_id, "approved", "2024-01-01T00:00:00Z"),
                review(product_id, "pending", "2024-03-01T00:00:00Z"),
            ],
        );

        let reviews = Listings::new(&backend).reviews().await.unwrap();

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].status, ReviewStatus::Pending);
        assert_eq!(reviews[0].product.as_ref().unwrap().name, "Pixel 9");
    }
}
