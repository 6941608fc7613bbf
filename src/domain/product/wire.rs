//! Wire types for the `products` table.

use super::HiddenReason;
use crate::shared::{ProductId, Website};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PRODUCTS_TABLE: &str = "products";
pub const PRICES_TABLE: &str = "prices";

/// Columns read for listings.
pub const PRODUCT_COLUMNS: &str =
    "id,name,category,website,product_link,is_hidden,hidden_reason,hidden_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub website: Website,
    #[serde(default)]
    pub product_link: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub hidden_reason: Option<HiddenReason>,
    #[serde(default)]
    pub hidden_at: Option<DateTime<Utc>>,
}

/// Patch for the visibility columns. `None` fields serialize as `null` so
/// showing a product clears the reason and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityPatch {
    pub is_hidden: bool,
    pub hidden_reason: Option<HiddenReason>,
    pub hidden_at: Option<DateTime<Utc>>,
}

impl VisibilityPatch {
    pub fn hide(reason: HiddenReason, at: DateTime<Utc>) -> Self {
        Self {
            is_hidden: true,
            hidden_reason: Some(reason),
            hidden_at: Some(at),
        }
    }

    pub fn show() -> Self {
        Self {
            is_hidden: false,
            hidden_reason: None,
            hidden_at: None,
        }
    }
}

/// Minimal row returned by bulk updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdRow {
    pub id: ProductId,
}
