//! Entity rows as stored in the hosted backend.
//!
//! Each `New*` struct is the insert payload for its table; the backend fills
//! in ids and timestamps and returns the full row.

pub mod category;
pub mod product;
pub mod profile;
pub mod review;
pub mod shop;
pub mod stats;
pub mod visit;

pub use category::Category;
pub use product::{NewProduct, Product, Specifications, spec_value_text};
pub use profile::{Profile, ProfileUpdate};
pub use review::{NewReview, ProductName, Review, ReviewVote};
pub use shop::{NewShop, Shop, ShopProduct};
pub use stats::PlatformStats;
pub use visit::NewVisit;
