//! Product filter state and its translation into a backend query.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use techspec_core::{CategoryId, Product, ProductStatus};

use crate::backend::{Column, Direction, Filter, Query, contains_pattern};

/// Columns returned for product listings, with the category embedded.
pub const PRODUCT_SELECT: &str = "*, category:categories(*)";

/// One specification sub-filter.
///
/// Written `key:needle` (`network:5G`) to match inside one attribute, or as a
/// bare needle (`touch`) to match anywhere in the specification bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTerm {
    pub key: Option<String>,
    pub needle: String,
}

impl SpecTerm {
    /// Parse a term. Returns `None` when the needle is blank.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (key, needle) = match raw.split_once(':') {
            Some((key, needle)) => (Some(key.trim()).filter(|k| !k.is_empty()), needle),
            None => (None, raw),
        };
        let needle = needle.trim();
        if needle.is_empty() {
            return None;
        }
        Some(Self {
            key: key.map(str::to_string),
            needle: needle.to_string(),
        })
    }

    /// Case-insensitive substring match against a product's specification bag.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let needle = self.needle.to_lowercase();
        match &self.key {
            Some(key) => product
                .spec(key)
                .is_some_and(|value| value.to_lowercase().contains(&needle)),
            None => serde_json::to_string(&product.specifications)
                .is_ok_and(|bag| bag.to_lowercase().contains(&needle)),
        }
    }

    /// The backend predicate for keyed terms. Bare terms have none.
    fn predicate(&self) -> Option<Filter> {
        let key = self.key.as_ref()?;
        Some(Filter::ILike(
            Column::json_text("specifications", key),
            contains_pattern(&self.needle),
        ))
    }
}

impl fmt::Display for SpecTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}:{}", self.needle),
            None => f.write_str(&self.needle),
        }
    }
}

/// Listing filter, as sent by the product list UI.
///
/// Query-string form: `?q=pixel&minPrice=100&maxPrice=900&brand=goo&
/// status=active&category=phones&spec=network:5G,touch&releasedAfter=2024-01-01`.
/// Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<ProductStatus>,
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
    /// Free text matched against name, brand and description.
    #[serde(default, alias = "q")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "spec_terms")]
    pub spec: Vec<SpecTerm>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub released_after: Option<NaiveDate>,
}

fn spec_terms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<SpecTerm>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(SpecTerm::parse)
        .collect())
}

/// Parse an optional query value, treating a blank one as absent.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl ProductFilter {
    /// The category slug to resolve, if any.
    #[must_use]
    pub fn category_slug(&self) -> Option<&str> {
        non_blank(self.category.as_ref())
    }

    /// Whether some spec term cannot be expressed as a backend predicate.
    #[must_use]
    pub fn needs_local_spec_match(&self) -> bool {
        self.spec.iter().any(|term| term.key.is_none())
    }

    /// Whether every spec term matches `product`.
    #[must_use]
    pub fn spec_matches(&self, product: &Product) -> bool {
        self.spec.iter().all(|term| term.matches(product))
    }

    /// Build the listing query. `category` is the already-resolved id of
    /// [`category_slug`](Self::category_slug); `None` omits the predicate.
    #[must_use]
    pub fn to_query(&self, category: Option<CategoryId>) -> Query {
        let mut query = Query::table("products")
            .select(PRODUCT_SELECT)
            .order("created_at", Direction::Desc);

        if let Some(min) = self.min_price {
            query = query.filter(Filter::Gte(Column::new("price"), min.to_string()));
        }
        if let Some(max) = self.max_price {
            query = query.filter(Filter::Lte(Column::new("price"), max.to_string()));
        }
        if let Some(brand) = non_blank(self.brand.as_ref()) {
            query = query.filter(Filter::ILike(Column::new("brand"), contains_pattern(brand)));
        }
        if let Some(status) = self.status {
            query = query.eq("status", status);
        }
        if let Some(id) = category {
            query = query.eq("category_id", id);
        }
        if let Some(text) = non_blank(self.query.as_ref()) {
            let pattern = contains_pattern(text);
            query = query.filter(Filter::Or(
                ["name", "brand", "description"]
                    .into_iter()
                    .map(|column| Filter::ILike(Column::new(column), pattern.clone()))
                    .collect(),
            ));
        }
        if let Some(date) = self.released_after {
            query = query.filter(Filter::Gte(Column::new("release_date"), date.to_string()));
        }
        for predicate in self.spec.iter().filter_map(SpecTerm::predicate) {
            query = query.filter(predicate);
        }

        query
    }
}
