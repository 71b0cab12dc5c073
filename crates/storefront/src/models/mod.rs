//! Request-level models for storefront.
//!
//! Catalog entities live in `techspec_core`; these are the types that only
//! make sense inside a request (the authenticated caller, session keys).

pub mod session;
pub mod user;

pub use session::keys as session_keys;
pub use user::CurrentUser;
