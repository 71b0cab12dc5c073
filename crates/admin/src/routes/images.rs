//! Product image upload.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::post,
};

use techspec_core::ProductId;

use crate::error::{AppError, Result};
use crate::extract::{ApiMultipart, ApiPath};
use crate::middleware::RequireAdminToken;
use crate::services::{ImageUploader, ProductImages, Upload};
use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products/{product_id}/images", post(upload))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
}

/// Upload an image (multipart field `file`) and append it to the product.
///
/// # Errors
///
/// Returns 400 without a usable `file` field or for a non-image, 404 for an
/// unknown product and 500 if storage or the backend fails.
pub async fn upload(
    State(state): State<AppState>,
    _admin: RequireAdminToken,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiMultipart(mut multipart): ApiMultipart,
) -> Result<Json<ProductImages>> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        file = Some(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = file.ok_or_else(|| AppError::BadRequest(format!("missing '{FILE_FIELD}' field")))?;
    let images = ImageUploader::new(state.backend(), state.images())
        .add(product_id, file)
        .await?;
    Ok(Json(images))
}
