//! Catalog products.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Category;
use crate::types::{CategoryId, Price, ProductId, ProductStatus, Slug};

/// The semi-structured per-product attribute map ("specification bag").
pub type Specifications = serde_json::Map<String, Value>;

/// A product row (`products` table), optionally with its category embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: Slug,
    pub brand: String,
    pub model: String,
    pub description: Option<String>,
    #[serde(default)]
    pub specifications: Specifications,
    /// Image URLs in display order; the first is the main image.
    #[serde(default)]
    pub images: Vec<String>,
    pub release_date: Option<NaiveDate>,
    pub price: Option<Price>,
    #[serde(default)]
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Product {
    /// Display text of a specification value, if the product has that key.
    #[must_use]
    pub fn spec(&self, key: &str) -> Option<String> {
        self.specifications.get(key).map(spec_value_text)
    }
}

/// Insert payload for `products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: Slug,
    pub brand: String,
    pub model: String,
    pub price: Option<Price>,
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Render a specification value the way it is shown and searched.
///
/// Strings are used verbatim, `null` is empty, arrays are joined with
/// `", "`, everything else uses its JSON text.
#[must_use]
pub fn spec_value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(spec_value_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_row() {
        let row = json!({
            "id": "7f0c1ad2-2f5b-4bb6-9a6e-3d3f7c7d8e90",
            "category_id": null,
            "name": "Pixel 9",
            "slug": "pixel-9",
            "brand": "Google",
            "model": "GA05843",
            "description": null,
            "specifications": {"network": "5G", "ram_gb": 12},
            "images": ["https://example.com/a.jpg"],
            "release_date": "2024-08-22",
            "price": 799.0,
            "status": "active",
            "created_at": "2024-09-01T10:00:00+00:00",
            "updated_at": "2024-09-01T10:00:00+00:00"
        });
        let product: Product = serde_json::from_value(row).unwrap();
        assert_eq!(product.spec("network").as_deref(), Some("5G"));
        assert_eq!(product.spec("ram_gb").as_deref(), Some("12"));
        assert!(product.spec("battery").is_none());
        assert!(product.category.is_none());
    }

    #[test]
    fn test_missing_bag_defaults_to_empty() {
        let row = json!({
            "id": "7f0c1ad2-2f5b-4bb6-9a6e-3d3f7c7d8e90",
            "category_id": null,
            "name": "Old phone",
            "slug": "old-phone",
            "brand": "Nokia",
            "model": "3310",
            "description": null,
            "release_date": null,
            "price": null,
            "status": "discontinued",
            "created_at": "2024-09-01T10:00:00Z",
            "updated_at": "2024-09-01T10:00:00Z"
        });
        let product: Product = serde_json::from_value(row).unwrap();
        assert!(product.specifications.is_empty());
        assert!(product.images.is_empty());
        assert_eq!(product.status, ProductStatus::Discontinued);
    }

    #[test]
    fn test_spec_value_text() {
        assert_eq!(spec_value_text(&json!(["4G", "5G"])), "4G, 5G");
        assert_eq!(spec_value_text(&json!(true)), "true");
        assert_eq!(spec_value_text(&Value::Null), "");
    }
}
