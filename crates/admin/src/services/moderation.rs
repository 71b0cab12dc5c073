//! Review and shop moderation.
//!
//! A decision is a conditional update (`id = X and status = pending`), so two
//! admins racing on the same row cannot both win and a decided row is never
//! overwritten.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use techspec_core::{ModerationStatus, ReviewId, ReviewStatus, ShopId, ShopStatus};
use techspec_storefront::backend::{Backend, BackendError, Query, fetch_optional};

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("status '{0}' is not a moderation decision")]
    NotADecision(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{entity} is no longer pending (currently {current})")]
    NotPending {
        entity: &'static str,
        current: String,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Deserialize)]
struct StatusRow<S> {
    status: S,
}

/// Moderation through a backend handle (service key).
pub struct Moderator<'a> {
    backend: &'a dyn Backend,
}

impl<'a> Moderator<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Approve or reject a pending review.
    ///
    /// # Errors
    ///
    /// Returns `NotADecision` for `pending`, `NotFound` for an unknown id and
    /// `NotPending` if the review was already decided.
    #[instrument(skip(self))]
    pub async fn review(&self, id: ReviewId, status: ReviewStatus) -> Result<(), ModerationError> {
        self.decide("reviews", "review", &id.to_string(), status).await
    }

    /// Approve or reject a pending shop.
    ///
    /// # Errors
    ///
    /// Same as [`review`](Self::review).
    #[instrument(skip(self))]
    pub async fn shop(&self, id: ShopId, status: ShopStatus) -> Result<(), ModerationError> {
        self.decide("shops", "shop", &id.to_string(), status).await
    }

    async fn decide<S>(
        &self,
        table: &str,
        entity: &'static str,
        id: &str,
        status: S,
    ) -> Result<(), ModerationError>
    where
        S: ModerationStatus + DeserializeOwned,
    {
        if !S::INITIAL.can_transition_to(status) {
            return Err(ModerationError::NotADecision(status.to_string()));
        }

        let pending = Query::table(table)
            .eq("id", id)
            .eq("status", S::INITIAL);
        let updated = self
            .backend
            .update(&pending, json!({ "status": status.to_string() }))
            .await?;
        if !updated.is_empty() {
            tracing::info!(entity, id, %status, "Moderation decision recorded");
            return Ok(());
        }

        // Nothing matched: tell a missing row from an already decided one.
        let query = Query::table(table).select("status").eq("id", id);
        match fetch_optional::<StatusRow<S>>(self.backend, &query).await? {
            None => Err(ModerationError::NotFound(format!("{entity} {id}"))),
            Some(row) => Err(ModerationError::NotPending {
                entity,
                current: row.status.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::Value;
    use techspec_storefront::backend::{MemoryBackend, Op};

    fn seeded(table: &str, status: &str) -> (MemoryBackend, String) {
        let backend = MemoryBackend::new();
        let id = uuid::Uuid::new_v4().to_string();
        backend.seed(table, vec![json!({"id": id, "status": status})]);
        (backend, id)
    }

    fn status_of(backend: &MemoryBackend, table: &str) -> Value {
        backend.rows(table)[0]["status"].clone()
    }

    #[tokio::test]
    async fn test_approves_pending_review() {
        let (backend, id) = seeded("reviews", "pending");
        Moderator::new(&backend)
            .review(id.parse().unwrap(), ReviewStatus::Approved)
            .await
            .unwrap();
        assert_eq!(status_of(&backend, "reviews"), "approved");
    }

    #[tokio::test]
    async fn test_decided_review_is_conflict() {
        let (backend, id) = seeded("reviews", "rejected");
        let err = Moderator::new(&backend)
            .review(id.parse().unwrap(), ReviewStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::NotPending { ref current, .. } if current == "rejected"));
        assert_eq!(status_of(&backend, "reviews"), "rejected");
    }

    #[tokio::test]
    async fn test_unknown_shop_is_not_found() {
        let (backend, _) = seeded("shops", "pending");
        let err = Moderator::new(&backend)
            .shop(ShopId::random(), ShopStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pending_is_not_a_decision() {
        let (backend, id) = seeded("shops", "pending");
        let err = Moderator::new(&backend)
            .shop(id.parse().unwrap(), ShopStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::NotADecision(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_suspended_is_not_a_decision() {
        let (backend, id) = seeded("shops", "pending");
        let result = Moderator::new(&backend)
            .shop(id.parse().unwrap(), ShopStatus::Suspended)
            .await;
        assert!(matches!(result, Err(ModerationError::NotADecision(_))));
        assert_eq!(backend.count(Op::Update, "shops"), 0);
    }
}
