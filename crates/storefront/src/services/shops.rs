//! Shop self-registration and per-product shop offers.

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use techspec_core::{
    Email, EmailError, NewShop, ProductId, ProfileRole, Shop, ShopProduct, ShopStatus, Slug, UserId,
};

use crate::backend::{Backend, BackendError, Query, fetch_all, insert_returning};

/// Errors from shop operations.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("must be signed in")]
    NotAuthenticated,

    #[error("shop name is required")]
    MissingName,

    #[error("invalid shop email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Shop registration form. Optional fields may be blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Shop listings offering a product, each with its shop embedded.
#[must_use]
pub fn offers_query(product_id: ProductId) -> Query {
    Query::table("shop_products")
        .select("*, shop:shops(*)")
        .eq("product_id", product_id)
}

/// Shop operations for one request.
pub struct ShopService<'a> {
    backend: &'a dyn Backend,
}

impl<'a> ShopService<'a> {
    /// `backend` should carry the caller's access token.
    #[must_use]
    pub const fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Register a shop for the caller in `pending` status, then promote the
    /// caller's profile to `shop_owner`.
    ///
    /// These are two independent writes. If the role update fails the shop
    /// row stays and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any remote call, or the first
    /// backend error.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn register(&self, user: Option<UserId>, form: ShopForm) -> Result<Shop, ShopError> {
        let owner_id = user.ok_or(ShopError::NotAuthenticated)?;
        let name = form.name.trim();
        if name.is_empty() {
            return Err(ShopError::MissingName);
        }
        let email = optional(form.email)
            .map(|e| Email::parse(&e))
            .transpose()?;

        let shop = NewShop {
            owner_id,
            name: name.to_string(),
            slug: Slug::from_name(name),
            description: optional(form.description),
            address: optional(form.address),
            phone: optional(form.phone),
            email: email.map(Email::into_inner),
            website: optional(form.website),
            status: ShopStatus::Pending,
        };
        let shop: Shop = insert_returning(self.backend, "shops", &shop).await?;
        tracing::info!(shop_id = %shop.id, "Shop registered");

        self.backend
            .update(
                &Query::table("profiles").eq("id", owner_id),
                json!({ "role": ProfileRole::ShopOwner }),
            )
            .await?;

        Ok(shop)
    }

    /// Shops offering a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn offers_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ShopProduct>, ShopError> {
        Ok(fetch_all(self.backend, &offers_query(product_id)).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Op};

    fn form(name: &str) -> ShopForm {
        ShopForm {
            name: name.into(),
            email: Some("Sales@Gadget.Example".into()),
            phone: Some("  ".into()),
            ..ShopForm::default()
        }
    }

    #[tokio::test]
    async fn test_register_inserts_pending_and_promotes_owner() {
        let backend = MemoryBackend::new();
        let (user, _token) = backend.create_user("owner@example.com", "hunter22", "Owner");
        let shops = ShopService::new(&backend);

        let shop = shops.register(Some(user.id), form("Gadget Hub!")).await.unwrap();

        assert_eq!(shop.status, ShopStatus::Pending);
        assert_eq!(shop.slug.as_str(), "gadget-hub-");
        assert_eq!(shop.email.as_deref(), Some("Sales@gadget.example"));
        assert_eq!(shop.phone, None);
        assert_eq!(backend.rows("profiles")[0]["role"], "shop_owner");
    }

    #[tokio::test]
    async fn test_register_validates_before_calls() {
        let backend = MemoryBackend::new();
        let shops = ShopService::new(&backend);

        assert!(matches!(
            shops.register(None, form("Shop")).await,
            Err(ShopError::NotAuthenticated)
        ));
        assert!(matches!(
            shops.register(Some(UserId::random()), form("   ")).await,
            Err(ShopError::MissingName)
        ));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_role_update_keeps_shop() {
        let backend = MemoryBackend::new();
        backend.fail_table("profiles");
        let shops = ShopService::new(&backend);

        let err = shops
            .register(Some(UserId::random()), form("Corner Store"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Backend(_)));
        assert_eq!(backend.rows("shops").len(), 1);
        assert_eq!(backend.count(Op::Update, "profiles"), 1);
    }
}
