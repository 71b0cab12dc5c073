//! Business logic behind the admin endpoints.
//!
//! Each service borrows a `&dyn Backend` (acting with the service key) for
//! the duration of one request.

pub mod images;
pub mod import;
pub mod listings;
pub mod moderation;

pub use images::{ImageError, ImageStore, ImageUploader, PRODUCT_IMAGES_BUCKET, ProductImages, Upload};
#[cfg(any(test, feature = "test-support"))]
pub use images::MemoryImageStore;
pub use import::{ImportError, ProductImporter, RowOutcome, RowResult};
pub use listings::Listings;
pub use moderation::{ModerationError, Moderator};
