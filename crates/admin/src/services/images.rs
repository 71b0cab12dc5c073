//! Product image upload.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use techspec_core::ProductId;
use techspec_storefront::backend::{Backend, BackendError, Query, StorageClient, fetch_optional};

/// Public bucket holding product images.
pub const PRODUCT_IMAGES_BUCKET: &str = "product-images";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("'{0}' is not an image type")]
    NotAnImage(String),

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Where uploaded objects go.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[async_trait]
impl ImageStore for StorageClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        Self::upload(self, bucket, path, bytes, content_type).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        Self::public_url(self, bucket, path)
    }
}

/// A product's image list after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImages {
    pub id: ProductId,
    #[serde(default)]
    pub images: Vec<String>,
}

/// One uploaded file.
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// File extension for the stored object: the uploaded name's, else one
    /// derived from the content type.
    fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        from_name.unwrap_or_else(|| {
            match self.content_type.trim_start_matches("image/") {
                "jpeg" => "jpg".to_string(),
                "svg+xml" => "svg".to_string(),
                other => other.chars().filter(char::is_ascii_alphanumeric).collect(),
            }
        })
    }
}

/// Stores images and appends their public URLs to `products.images`.
pub struct ImageUploader<'a> {
    backend: &'a dyn Backend,
    store: &'a dyn ImageStore,
}

impl<'a> ImageUploader<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, store: &'a dyn ImageStore) -> Self {
        Self { backend, store }
    }

    /// Upload `file` under `<product id>/<uuid>.<ext>` and append its URL.
    ///
    /// The product is checked first so no object is stored for an unknown
    /// id. The append reads then rewrites the list; concurrent uploads to
    /// the same product can lose one URL.
    ///
    /// # Errors
    ///
    /// Returns `Empty` or `NotAnImage` before any remote call,
    /// `ProductNotFound` for an unknown id, or the backend error.
    #[instrument(skip(self, file), fields(size = file.bytes.len(), content_type = %file.content_type))]
    pub async fn add(&self, product_id: ProductId, file: Upload) -> Result<ProductImages, ImageError> {
        if file.bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if !file.content_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(file.content_type));
        }

        let query = Query::table("products")
            .select("id, images")
            .eq("id", product_id);
        let mut product: ProductImages = fetch_optional(self.backend, &query)
            .await?
            .ok_or(ImageError::ProductNotFound(product_id))?;

        let path = format!("{product_id}/{}.{}", Uuid::new_v4(), file.extension());
        self.store
            .upload(PRODUCT_IMAGES_BUCKET, &path, file.bytes, &file.content_type)
            .await?;

        product
            .images
            .push(self.store.public_url(PRODUCT_IMAGES_BUCKET, &path));
        let target = Query::table("products").eq("id", product_id);
        self.backend
            .update(&target, json!({ "images": product.images }))
            .await?;

        tracing::info!(%product_id, path, "Product image uploaded");
        Ok(product)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryImageStore;

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use std::sync::{Arc, Mutex, PoisonError};

    use super::{BackendError, ImageStore, async_trait};

    /// In-memory object store recording `(bucket, path, size)`.
    #[derive(Clone, Default)]
    pub struct MemoryImageStore {
        objects: Arc<Mutex<Vec<(String, String, usize)>>>,
    }

    impl MemoryImageStore {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        pub fn objects(&self) -> Vec<(String, String, usize)> {
            self.objects
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    #[async_trait]
    impl ImageStore for MemoryImageStore {
        async fn upload(
            &self,
            bucket: &str,
            path: &str,
            bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<(), BackendError> {
            self.objects
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((bucket.to_string(), path.to_string(), bytes.len()));
            Ok(())
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("https://storage.test/{bucket}/{path}")
        }
    }
}
