//! Best-effort page view tracking.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use uuid::Uuid;

use techspec_core::{NewVisit, UserId};

use crate::backend::{Backend, BackendError};

pub const VISITS_TABLE: &str = "visitor_analytics";

/// Procedure that records a visit server-side (alternative to the insert).
pub const RECORD_VISIT_RPC: &str = "record_visit";

/// Writes page views to the backend.
///
/// Failures are returned, never raised; request paths use
/// [`record_in_background`](Self::record_in_background) and move on.
#[derive(Clone)]
pub struct VisitorTracker {
    backend: Arc<dyn Backend>,
}

impl VisitorTracker {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Insert one visit row.
    ///
    /// # Errors
    ///
    /// Returns the backend error; callers are free to ignore it.
    pub async fn record(&self, visit: &NewVisit) -> Result<(), BackendError> {
        let row = serde_json::to_value([visit])?;
        self.backend.insert(VISITS_TABLE, row).await?;
        Ok(())
    }

    /// Record a visit through the `record_visit` procedure.
    ///
    /// # Errors
    ///
    /// Returns the backend error; callers are free to ignore it.
    pub async fn record_via_rpc(
        &self,
        session_id: Uuid,
        user_agent: &str,
        user_id: Option<UserId>,
    ) -> Result<(), BackendError> {
        self.backend
            .rpc(
                RECORD_VISIT_RPC,
                json!({
                    "p_session_id": session_id,
                    "p_user_agent": user_agent,
                    "p_user_id": user_id,
                }),
            )
            .await?;
        Ok(())
    }

    /// Fire-and-forget [`record`](Self::record); failures are logged at `warn`.
    pub fn record_in_background(&self, visit: NewVisit) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            if let Err(e) = tracker.record(&visit).await {
                tracing::warn!(
                    error = %e,
                    session_id = %visit.session_id,
                    page_url = %visit.page_url,
                    "Failed to track visit"
                );
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn visit() -> NewVisit {
        NewVisit {
            session_id: Uuid::new_v4(),
            user_id: None,
            page_url: "https://techspecdev.vercel.app/products/pixel-9".into(),
            referrer: String::new(),
            user_agent: "Mozilla/5.0".into(),
        }
    }

    #[tokio::test]
    async fn test_record_inserts_row() {
        let backend = MemoryBackend::new();
        let tracker = VisitorTracker::new(Arc::new(backend.clone()));
        let visit = visit();

        tracker.record(&visit).await.unwrap();

        let rows = backend.rows(VISITS_TABLE);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["session_id"], visit.session_id.to_string());
        assert_eq!(rows[0]["user_id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_background_failure_is_swallowed() {
        let backend = MemoryBackend::new();
        backend.fail_table(VISITS_TABLE);
        let tracker = VisitorTracker::new(Arc::new(backend.clone()));

        // The task completes normally even though the insert failed.
        tracker.record_in_background(visit()).await.unwrap();
        assert!(backend.rows(VISITS_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_rpc_variant_uses_prefixed_args() {
        let backend = MemoryBackend::new();
        let tracker = VisitorTracker::new(Arc::new(backend.clone()));
        let session = Uuid::new_v4();

        tracker.record_via_rpc(session, "curl/8", None).await.unwrap();

        let rows = backend.rows(VISITS_TABLE);
        assert_eq!(rows[0]["session_id"], session.to_string());
        assert_eq!(rows[0]["user_agent"], "curl/8");
    }
}
