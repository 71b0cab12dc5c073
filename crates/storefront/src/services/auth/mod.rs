//! Authentication flows.
//!
//! The auth protocol lives in the hosted service. These flows only do the
//! form checks the pages used to do (required name, password length and
//! confirmation) and then hand off to [`AuthApi`].

mod error;

pub use error::AuthFlowError;

use secrecy::SecretString;
use tracing::instrument;

use techspec_core::Email;

use crate::backend::{AuthApi, AuthSession, AuthUser, OtpType, SignUpOutcome};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Path the recovery email links back to.
pub const RESET_PASSWORD_PATH: &str = "/reset-password";

/// Authentication flows for one request.
pub struct AuthFlows<'a> {
    auth: &'a dyn AuthApi,
    site_url: Option<&'a str>,
}

impl<'a> AuthFlows<'a> {
    /// `site_url` is the configured public base URL, preferred over the
    /// request origin when building redirect links.
    #[must_use]
    pub const fn new(auth: &'a dyn AuthApi, site_url: Option<&'a str>) -> Self {
        Self { auth, site_url }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthFlowError::MissingFullName` or `InvalidEmail` before any
    /// remote call, or the auth service's rejection.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthFlowError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AuthFlowError::MissingFullName);
        }
        let email = Email::parse(email)?;

        let outcome = self
            .auth
            .sign_up(email.as_str(), password, full_name)
            .await?;
        tracing::info!(user_id = %outcome.user.id, confirmed = outcome.session.is_some(), "User signed up");
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns the auth service's rejection (e.g. invalid credentials).
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthFlowError> {
        let email = Email::parse(email)?;
        Ok(self.auth.sign_in(email.as_str(), password).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the auth service call fails.
    pub async fn sign_out(&self, access_token: &SecretString) -> Result<(), AuthFlowError> {
        Ok(self.auth.sign_out(access_token).await?)
    }

    /// Send a password recovery email linking to
    /// `<SITE_URL or origin>/reset-password`.
    ///
    /// # Errors
    ///
    /// Returns `AuthFlowError::MissingRedirectBase` if no base URL is known,
    /// or the auth service's rejection.
    #[instrument(skip(self))]
    pub async fn recover(&self, email: &str, origin: Option<&str>) -> Result<(), AuthFlowError> {
        let email = Email::parse(email)?;
        let redirect_to = self.reset_link(origin)?;
        Ok(self.auth.recover(email.as_str(), &redirect_to).await?)
    }

    /// Set a new password for the signed-in user (also the last step of a
    /// recovery, after [`verify_otp`](Self::verify_otp)).
    ///
    /// # Errors
    ///
    /// Returns `PasswordTooShort` or `PasswordMismatch` before any remote
    /// call, or the auth service's rejection.
    pub async fn change_password(
        &self,
        access_token: &SecretString,
        password: &str,
        confirmation: &str,
    ) -> Result<AuthUser, AuthFlowError> {
        validate_password(password, confirmation)?;
        Ok(self.auth.update_password(access_token, password).await?)
    }

    /// Exchange an emailed token for a session.
    ///
    /// # Errors
    ///
    /// Returns the auth service's rejection (expired or invalid token).
    pub async fn verify_otp(
        &self,
        token_hash: &str,
        kind: OtpType,
    ) -> Result<AuthSession, AuthFlowError> {
        Ok(self.auth.verify_otp(token_hash, kind).await?)
    }

    fn reset_link(&self, origin: Option<&str>) -> Result<String, AuthFlowError> {
        let base = self
            .site_url
            .or(origin)
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .ok_or(AuthFlowError::MissingRedirectBase)?;
        Ok(format!(
            "{}{RESET_PASSWORD_PATH}",
            base.trim_end_matches('/')
        ))
    }
}

/// Check a new password against its confirmation.
///
/// # Errors
///
/// Returns `PasswordTooShort` below [`MIN_PASSWORD_LENGTH`] characters and
/// `PasswordMismatch` if the two entries differ.
pub fn validate_password(password: &str, confirmation: &str) -> Result<(), AuthFlowError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthFlowError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }
    if password != confirmation {
        return Err(AuthFlowError::PasswordMismatch);
    }
    Ok(())
}
