//! The signed-in user's own profile.

use thiserror::Error;

use techspec_core::{Profile, ProfileUpdate, UserId};

use crate::backend::{Backend, BackendError, Query, fetch_optional};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

pub struct ProfileService<'a> {
    backend: &'a dyn Backend,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if the user has no profile row.
    pub async fn get(&self, user_id: UserId) -> Result<Profile, ProfileError> {
        fetch_optional(self.backend, &Query::table("profiles").eq("id", user_id))
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Apply the given fields. An empty update just returns the profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if the user has no profile row.
    pub async fn update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, ProfileError> {
        if update.is_empty() {
            return self.get(user_id).await;
        }
        let patch = serde_json::to_value(update).map_err(BackendError::from)?;
        let rows = self
            .backend
            .update(&Query::table("profiles").eq("id", user_id), patch)
            .await?;
        let row = rows.into_iter().next().ok_or(ProfileError::NotFound)?;
        Ok(serde_json::from_value(row).map_err(BackendError::from)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[tokio::test]
    async fn test_update_only_given_fields() {
        let backend = MemoryBackend::new();
        let (user, _) = backend.create_user("bo@example.com", "secret1", "Bo");
        let profiles = ProfileService::new(&backend);

        let update = ProfileUpdate {
            bio: Some("Phone nerd".into()),
            ..ProfileUpdate::default()
        };
        let profile = profiles.update(user.id, &update).await.unwrap();
        assert_eq!(profile.bio.as_deref(), Some("Phone nerd"));
        assert_eq!(profile.full_name.as_deref(), Some("Bo"));
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let backend = MemoryBackend::new();
        let err = ProfileService::new(&backend)
            .update(UserId::random(), &ProfileUpdate { bio: Some("x".into()), ..ProfileUpdate::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::NotFound));
    }
}
