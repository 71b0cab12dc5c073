//! Shops and their product offers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, ShopId, ShopProductId, ShopStatus, Slug, StockStatus, UserId};

/// A registered shop (`shops` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub owner_id: UserId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub status: ShopStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for self-service shop registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShop {
    pub owner_id: UserId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub status: ShopStatus,
}

/// A shop's offer for a product (`shop_products` table), with the shop embedded
/// when selected as `*, shop:shops(*)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopProduct {
    pub id: ShopProductId,
    pub shop_id: ShopId,
    pub product_id: ProductId,
    pub price: Price,
    pub stock_status: StockStatus,
    pub stock_quantity: Option<i32>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop: Option<Shop>,
}
