//! Product reviews and helpfulness voting.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use techspec_core::{
    NewReview, ProductId, Rating, RatingError, Review, ReviewId, ReviewStatus, ReviewVote, UserId,
};

use crate::backend::{Backend, BackendError, Direction, Query, fetch_all, fetch_optional, insert_returning};

/// Procedure that recounts `reviews.helpful_count` from `review_votes`.
pub const RECOUNT_RPC: &str = "update_review_helpful_count";

/// Errors from review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The caller is not signed in.
    #[error("must be signed in")]
    NotAuthenticated,

    #[error("invalid rating: {0}")]
    Rating(#[from] RatingError),

    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Review submission form.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewForm {
    pub rating: i32,
    pub title: String,
    pub content: String,
}

/// Approved reviews of a product, newest first.
#[must_use]
pub fn approved_reviews_query(product_id: ProductId) -> Query {
    Query::table("reviews")
        .eq("product_id", product_id)
        .eq("status", ReviewStatus::Approved)
        .order("created_at", Direction::Desc)
}

/// Review operations for one request.
pub struct ReviewService<'a> {
    backend: &'a dyn Backend,
}

impl<'a> ReviewService<'a> {
    /// `backend` should carry the caller's access token for writes.
    #[must_use]
    pub const fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Submit a review. It stays `pending` until a moderator approves it.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::NotAuthenticated` for anonymous callers and a
    /// validation error for a bad rating or blank title/content, all before
    /// any remote call.
    #[instrument(skip(self, form))]
    pub async fn submit(
        &self,
        user: Option<UserId>,
        product_id: ProductId,
        form: ReviewForm,
    ) -> Result<Review, ReviewError> {
        let user_id = user.ok_or(ReviewError::NotAuthenticated)?;
        let rating = Rating::new(form.rating)?;
        let title = form.title.trim();
        if title.is_empty() {
            return Err(ReviewError::MissingField("title"));
        }
        let content = form.content.trim();
        if content.is_empty() {
            return Err(ReviewError::MissingField("content"));
        }

        let review = NewReview {
            product_id,
            user_id,
            rating,
            title: title.to_string(),
            content: content.to_string(),
            status: ReviewStatus::Pending,
        };
        Ok(insert_returning(self.backend, "reviews", &review).await?)
    }

    /// Approved reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn approved_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, ReviewError> {
        Ok(fetch_all(self.backend, &approved_reviews_query(product_id)).await?)
    }

    /// Record (or overwrite) the caller's helpfulness vote, then ask the
    /// backend to recount the review's `helpful_count`.
    ///
    /// The two calls are not atomic: if the recount fails the vote is kept
    /// and the counter stays stale until the next vote.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::NotAuthenticated` for anonymous callers before
    /// any remote call, or the first backend error.
    #[instrument(skip(self))]
    pub async fn vote(
        &self,
        user: Option<UserId>,
        review_id: ReviewId,
        is_helpful: bool,
    ) -> Result<(), ReviewError> {
        let user_id = user.ok_or(ReviewError::NotAuthenticated)?;
        let vote = ReviewVote {
            review_id,
            user_id,
            is_helpful,
        };

        self.backend
            .upsert(
                "review_votes",
                serde_json::to_value(vote).map_err(BackendError::from)?,
                "review_id,user_id",
            )
            .await?;
        self.backend
            .rpc(RECOUNT_RPC, json!({ "review_id": review_id }))
            .await?;
        Ok(())
    }

    /// The caller's stored vote on a review. Anonymous callers get `None`
    /// without a remote call.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn user_vote(
        &self,
        user: Option<UserId>,
        review_id: ReviewId,
    ) -> Result<Option<bool>, ReviewError> {
        let Some(user_id) = user else {
            return Ok(None);
        };
        let query = Query::table("review_votes")
            .select("review_id, user_id, is_helpful")
            .eq("review_id", review_id)
            .eq("user_id", user_id);
        let vote: Option<ReviewVote> = fetch_optional(self.backend, &query).await?;
        Ok(vote.map(|v| v.is_helpful))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Op};

    fn form(rating: i32, title: &str, content: &str) -> ReviewForm {
        ReviewForm {
            rating,
            title: title.into(),
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn test_vote_requires_user_before_any_call() {
        let backend = MemoryBackend::new();
        let reviews = ReviewService::new(&backend);
        let err = reviews.vote(None, ReviewId::random(), true).await.unwrap_err();
        assert!(matches!(err, ReviewError::NotAuthenticated));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_second_vote_overwrites_and_recounts_once_per_vote() {
        let backend = MemoryBackend::new();
        let review_id = ReviewId::random();
        let user = UserId::random();
        backend.seed(
            "reviews",
            vec![json!({"id": review_id, "helpful_count": 0, "status": "approved"})],
        );
        let reviews = ReviewService::new(&backend);

        reviews.vote(Some(user), review_id, true).await.unwrap();
        assert_eq!(backend.count(Op::Rpc, RECOUNT_RPC), 1);
        assert_eq!(backend.rows("reviews")[0]["helpful_count"], 1);

        reviews.vote(Some(user), review_id, false).await.unwrap();
        assert_eq!(backend.count(Op::Rpc, RECOUNT_RPC), 2);
        assert_eq!(backend.rows("review_votes").len(), 1);
        assert_eq!(backend.rows("reviews")[0]["helpful_count"], 0);
        assert_eq!(reviews.user_vote(Some(user), review_id).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_failed_recount_keeps_vote() {
        let backend = MemoryBackend::new();
        backend.fail_rpc(RECOUNT_RPC);
        let reviews = ReviewService::new(&backend);
        let review_id = ReviewId::random();

        let err = reviews
            .vote(Some(UserId::random()), review_id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Backend(_)));
        assert_eq!(backend.rows("review_votes").len(), 1);
    }

    #[tokio::test]
    async fn test_user_vote_anonymous_is_none() {
        let backend = MemoryBackend::new();
        let reviews = ReviewService::new(&backend);
        assert_eq!(reviews.user_vote(None, ReviewId::random()).await.unwrap(), None);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_validates_then_inserts_pending() {
        let backend = MemoryBackend::new();
        let reviews = ReviewService::new(&backend);
        let user = Some(UserId::random());
        let product = ProductId::random();

        assert!(matches!(
            reviews.submit(user, product, form(6, "t", "c")).await,
            Err(ReviewError::Rating(_))
        ));
        assert!(matches!(
            reviews.submit(user, product, form(4, "  ", "c")).await,
            Err(ReviewError::MissingField("title"))
        ));
        assert_eq!(backend.call_count(), 0);

        let review = reviews
            .submit(user, product, form(4, "Solid", "Battery lasts two days"))
            .await
            .unwrap();
        assert_eq!(review.status, ReviewStatus::Pending);
        assert_eq!(review.helpful_count, 0);
    }

    #[tokio::test]
    async fn test_approved_only_newest_first() {
        let backend = MemoryBackend::new();
        let product = ProductId::random();
        let row = |status: &str, created: &str| {
            json!({
                "id": ReviewId::random(),
                "product_id": product,
                "user_id": UserId::random(),
                "rating": 5,
                "title": "t",
                "content": "c",
                "helpful_count": 0,
                "status": status,
                "created_at": created,
                "updated_at": created,
            })
        };
        backend.seed(
            "reviews",
            vec![
                row("approved", "2024-01-01T00:00:00Z"),
                row("pending", "2024-03-01T00:00:00Z"),
                row("approved", "2024-02-01T00:00:00Z"),
            ],
        );

        let reviews = ReviewService::new(&backend)
            .approved_for_product(product)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews[0].created_at > reviews[1].created_at);
    }
}
