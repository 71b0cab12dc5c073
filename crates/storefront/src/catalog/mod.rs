//! Product catalog: listings, detail pages and comparisons.
//!
//! Category slugs are resolved to ids through a `moka` cache (5-minute TTL).
//! Only hits are cached, so a category created after a failed lookup shows
//! up on the next request.

pub mod compare;
pub mod filter;

pub use compare::{Comparison, MAX_COMPARE, SpecRow};
pub use filter::{PRODUCT_SELECT, ProductFilter, SpecTerm};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use techspec_core::{Category, CategoryId, Product, ProductId, Review, ShopProduct, average_rating};

use crate::backend::{Backend, BackendError, Direction, Query, fetch_all, fetch_optional};
use crate::services::reviews::approved_reviews_query;
use crate::services::shops::offers_query;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("select between 1 and {MAX_COMPARE} products to compare, got {0}")]
    InvalidComparison(usize),
}

/// Everything the product page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    /// Approved reviews, newest first.
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub review_count: usize,
    pub offers: Vec<ShopProduct>,
}

/// Read side of the catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    backend: Arc<dyn Backend>,
    categories: Cache<String, CategoryId>,
}

impl Catalog {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let categories = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogInner {
                backend,
                categories,
            }),
        }
    }

    fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    /// Resolve a category slug to its id.
    ///
    /// Fails open: an unknown slug or a failed lookup yields `None`, and the
    /// listing is then not filtered by category at all.
    #[instrument(skip(self))]
    pub async fn resolve_category(&self, slug: &str) -> Option<CategoryId> {
        if let Some(id) = self.inner.categories.get(slug).await {
            debug!("Cache hit for category");
            return Some(id);
        }

        let query = Query::table("categories").select("id").eq("slug", slug);
        let row: Option<IdRow> = match fetch_optional(self.backend(), &query).await {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(error = %e, "Category lookup failed, listing unfiltered");
                return None;
            }
        };

        let id = row?.id;
        self.inner.categories.insert(slug.to_string(), id).await;
        Some(id)
    }

    /// Products matching `filter`, newest first.
    ///
    /// Spec terms are sent as JSON-path predicates. When the backend refuses
    /// that form, or a term names no key, rows are fetched without the spec
    /// predicates and matched here instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, filter), fields(spec_terms = filter.spec.len()))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let category = match filter.category_slug() {
            Some(slug) => self.resolve_category(slug).await,
            None => None,
        };
        let query = filter.to_query(category);

        if filter.needs_local_spec_match() {
            return self.list_matching_locally(&query, filter).await;
        }

        match fetch_all(self.backend(), &query).await {
            Ok(products) => Ok(products),
            Err(e) if e.is_rejected() && !filter.spec.is_empty() => {
                tracing::warn!(error = %e, "Spec predicates rejected, matching locally");
                self.list_matching_locally(&query, filter).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_matching_locally(
        &self,
        query: &Query,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, CatalogError> {
        let products: Vec<Product> =
            fetch_all(self.backend(), &query.without_json_filters()).await?;
        Ok(products
            .into_iter()
            .filter(|product| filter.spec_matches(product))
            .collect())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown slug.
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, CatalogError> {
        let query = Query::table("products")
            .select(PRODUCT_SELECT)
            .eq("slug", slug);
        fetch_optional(self.backend(), &query)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("product {slug}")))
    }

    /// The product page: product with category, approved reviews and the
    /// shops offering it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown slug, or the first
    /// backend error.
    #[instrument(skip(self))]
    pub async fn product_detail(&self, slug: &str) -> Result<ProductDetail, CatalogError> {
        let product = self.product_by_slug(slug).await?;

        let reviews_query = approved_reviews_query(product.id);
        let offers_query = offers_query(product.id);
        let (reviews, offers) = tokio::join!(
            fetch_all::<Review>(self.backend(), &reviews_query),
            fetch_all::<ShopProduct>(self.backend(), &offers_query),
        );
        let reviews = reviews?;
        let offers = offers?;

        Ok(ProductDetail {
            average_rating: average_rating(reviews.iter().map(|r| r.rating)),
            review_count: reviews.len(),
            product,
            reviews,
            offers,
        })
    }

    /// All categories, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let query = Query::table("categories").order("name", Direction::Asc);
        Ok(fetch_all(self.backend(), &query).await?)
    }

    /// Compare up to [`MAX_COMPARE`] distinct products, in the order asked.
    ///
    /// Duplicate ids are collapsed. Ids that no longer exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidComparison` for zero or too many ids and `NotFound`
    /// when none of them exists.
    #[instrument(skip(self))]
    pub async fn compare(&self, ids: &[ProductId]) -> Result<Comparison, CatalogError> {
        let mut wanted: Vec<ProductId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !wanted.contains(id) {
                wanted.push(*id);
            }
        }
        if wanted.is_empty() || wanted.len() > MAX_COMPARE {
            return Err(CatalogError::InvalidComparison(wanted.len()));
        }

        let query = Query::table("products")
            .select(PRODUCT_SELECT)
            .in_list("id", &wanted);
        let mut found: Vec<Product> = fetch_all(self.backend(), &query).await?;
        if found.is_empty() {
            return Err(CatalogError::NotFound("products to compare".into()));
        }

        let products = wanted
            .iter()
            .filter_map(|id| {
                let index = found.iter().position(|p| p.id == *id)?;
                Some(found.swap_remove(index))
            })
            .collect();
        Ok(Comparison::build(products))
    }
}

#[derive(serde::Deserialize)]
struct IdRow {
    id: CategoryId,
}
