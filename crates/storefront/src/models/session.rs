//! Session-related types.

/// Session keys.
pub mod keys {
    /// Anonymous per-browser-session visitor id (`Uuid`).
    pub const VISITOR_ID: &str = "visitor_id";
}
