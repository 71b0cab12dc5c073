//! Authentication flow error types.

use thiserror::Error;

use crate::backend::AuthError;

/// Errors from the sign-up, sign-in and password flows.
///
/// Validation variants are raised before any remote call. `Auth` carries the
/// auth service's own message, which is shown to the user verbatim.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] techspec_core::EmailError),

    #[error("full name is required")]
    MissingFullName,

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("passwords do not match")]
    PasswordMismatch,

    /// Neither `SITE_URL` nor the request origin is known.
    #[error("cannot build the password reset link")]
    MissingRedirectBase,

    #[error("{0}")]
    Auth(#[from] AuthError),
}
