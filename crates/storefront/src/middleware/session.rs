//! Session middleware configuration.
//!
//! Sessions only carry the anonymous visitor id used for analytics, so they
//! live in process memory and end with the browser session.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ts_session";

/// Create the in-memory session layer.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    let is_secure = config
        .site_url
        .as_deref()
        .is_some_and(|url| url.starts_with("https://"));

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// This browser session's visitor id, created on first use.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn visitor_id(session: &Session) -> Result<Uuid, tower_sessions::session::Error> {
    if let Some(id) = session.get::<Uuid>(session_keys::VISITOR_ID).await? {
        return Ok(id);
    }
    let id = Uuid::new_v4();
    session.insert(session_keys::VISITOR_ID, id).await?;
    tracing::debug!(visitor_id = %id, "New visitor session");
    Ok(id)
}
