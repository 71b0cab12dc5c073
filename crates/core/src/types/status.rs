//! Status enums for catalog entities.
//!
//! All statuses are stored as lowercase snake_case text in the backend, so
//! every enum here serializes with `rename_all = "snake_case"` and offers
//! matching `Display`/`FromStr` implementations for query predicates and
//! CSV input.

use serde::{Deserialize, Serialize};

/// Error returned when a status string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct StatusParseError {
    kind: &'static str,
    value: String,
}

impl StatusParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// The backend representation of this status.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StatusParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(StatusParseError::new($kind, s)),
                }
            }
        }
    };
}

/// Product lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Upcoming,
    Discontinued,
}

text_enum!(ProductStatus, "product status", {
    Active => "active",
    Upcoming => "upcoming",
    Discontinued => "discontinued",
});

/// Stock status of a product at a particular shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    PreOrder,
}

text_enum!(StockStatus, "stock status", {
    InStock => "in_stock",
    OutOfStock => "out_of_stock",
    PreOrder => "pre_order",
});

/// Moderation status of a review.
///
/// Reviews are created `Pending` and only surface to shoppers once `Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

text_enum!(ReviewStatus, "review status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// Lifecycle status of a registered shop.
///
/// Self-service registration creates `Pending` shops; only admin action moves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShopStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Suspended,
}

text_enum!(ShopStatus, "shop status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Suspended => "suspended",
});

/// Role of a user profile, controlling which affordances are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
    #[default]
    User,
    ShopOwner,
    Admin,
}

text_enum!(ProfileRole, "profile role", {
    User => "user",
    ShopOwner => "shop_owner",
    Admin => "admin",
});

/// Forward-only moderation state machine shared by reviews and shops.
///
/// The only transitions exposed anywhere are `pending -> approved` and
/// `pending -> rejected`.
pub trait ModerationStatus: Copy + Eq + std::fmt::Display {
    /// The state new rows are created in.
    const INITIAL: Self;

    /// Whether an admin may move a row from `self` to `next`.
    fn can_transition_to(self, next: Self) -> bool;
}

impl ModerationStatus for ReviewStatus {
    const INITIAL: Self = Self::Pending;

    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Rejected)
        )
    }
}

impl ModerationStatus for ShopStatus {
    const INITIAL: Self = Self::Pending;

    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Rejected)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_text_matches_serde() {
        for status in [
            ProductStatus::Active,
            ProductStatus::Upcoming,
            ProductStatus::Discontinued,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.as_str().parse::<ProductStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_stock_status_snake_case() {
        assert_eq!(StockStatus::PreOrder.to_string(), "pre_order");
        assert_eq!(
            "out_of_stock".parse::<StockStatus>().unwrap(),
            StockStatus::OutOfStock
        );
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "archived".parse::<ProductStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid product status: archived");
    }

    #[test]
    fn test_review_transitions() {
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Approved));
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Rejected));
        assert!(!ReviewStatus::Approved.can_transition_to(ReviewStatus::Rejected));
        assert!(!ReviewStatus::Rejected.can_transition_to(ReviewStatus::Approved));
        assert!(!ReviewStatus::Approved.can_transition_to(ReviewStatus::Pending));
        assert!(!ReviewStatus::Pending.can_transition_to(ReviewStatus::Pending));
    }

    #[test]
    fn test_shop_transitions() {
        assert!(ShopStatus::Pending.can_transition_to(ShopStatus::Approved));
        assert!(ShopStatus::Pending.can_transition_to(ShopStatus::Rejected));
        assert!(!ShopStatus::Pending.can_transition_to(ShopStatus::Suspended));
        assert!(!ShopStatus::Approved.can_transition_to(ShopStatus::Suspended));
        assert!(!ShopStatus::Suspended.can_transition_to(ShopStatus::Approved));
    }

    #[test]
    fn test_role_default_is_user() {
        assert_eq!(ProfileRole::default(), ProfileRole::User);
        assert_eq!(ProfileRole::ShopOwner.to_string(), "shop_owner");
    }
}
