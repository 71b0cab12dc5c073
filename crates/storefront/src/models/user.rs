//! The authenticated caller.

use std::sync::Arc;

use secrecy::SecretString;

use techspec_core::UserId;

use crate::backend::{AuthUser, Backend};

/// A caller whose bearer token the auth service accepted.
///
/// Carries the token so backend calls made on the caller's behalf run under
/// their row-level security policies.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: AuthUser,
    pub access_token: SecretString,
}

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    /// `backend` acting as this user.
    #[must_use]
    pub fn scoped(&self, backend: &dyn Backend) -> Arc<dyn Backend> {
        backend.with_access_token(&self.access_token)
    }
}
