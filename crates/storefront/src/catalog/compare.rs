//! Side-by-side specification comparison.

use serde::Serialize;
use techspec_core::Product;

/// Most products shown in one comparison.
pub const MAX_COMPARE: usize = 4;

/// One specification key with each compared product's value (in the same
/// order as [`Comparison::products`]). Missing values are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecRow {
    pub key: String,
    pub values: Vec<Option<String>>,
}

/// A comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub products: Vec<Product>,
    pub rows: Vec<SpecRow>,
}

impl Comparison {
    /// Build the table. Keys appear in first-seen order across the products.
    #[must_use]
    pub fn build(products: Vec<Product>) -> Self {
        let mut keys: Vec<&String> = Vec::new();
        for product in &products {
            for key in product.specifications.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        let rows = keys
            .into_iter()
            .map(|key| SpecRow {
                key: key.clone(),
                values: products.iter().map(|p| p.spec(key)).collect(),
            })
            .collect();

        Self { products, rows }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(name: &str, specs: serde_json::Value) -> Product {
        serde_json::from_value(json!({
            "id": uuid::Uuid::new_v4(),
            "category_id": null,
            "name": name,
            "slug": name.to_lowercase(),
            "brand": "Acme",
            "model": name,
            "description": null,
            "specifications": specs,
            "release_date": null,
            "price": null,
            "status": "active",
            "created_at": "2024-09-01T10:00:00Z",
            "updated_at": "2024-09-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_union_of_keys_in_first_seen_order() {
        let a = product("A", json!({"network": "5G", "ram_gb": 8}));
        let b = product("B", json!({"battery": "5000mAh", "network": "4G"}));
        let table = Comparison::build(vec![a, b]);

        let keys: Vec<&str> = table.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"battery"));
        let network = table.rows.iter().find(|r| r.key == "network").unwrap();
        assert_eq!(network.values, vec![Some("5G".into()), Some("4G".into())]);
        let battery = table.rows.iter().find(|r| r.key == "battery").unwrap();
        assert_eq!(battery.values, vec![None, Some("5000mAh".into())]);
    }

    #[test]
    fn test_empty_bags() {
        let table = Comparison::build(vec![product("A", json!({}))]);
        assert!(table.rows.is_empty());
        assert_eq!(table.products.len(), 1);
    }
}
