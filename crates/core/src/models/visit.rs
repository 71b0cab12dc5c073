//! Page-view records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

/// One page view, inserted into `visitor_analytics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisit {
    /// Per-browser-session identifier, generated once per session.
    pub session_id: Uuid,
    pub user_id: Option<UserId>,
    pub page_url: String,
    pub referrer: String,
    pub user_agent: String,
}
