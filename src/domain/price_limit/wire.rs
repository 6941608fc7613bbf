//! Wire types for `category_price_limits`.

use crate::domain::product::HiddenReason;
use crate::shared::serde_util;
use crate::shared::ProductId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const LIMITS_TABLE: &str = "category_price_limits";

/// Upsert body; conflicts resolve on `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitUpsertBody {
    pub category: String,
    #[serde(with = "serde_util::decimal")]
    pub max_price: Decimal,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitActivePatch {
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Enforcement view of a product.
pub const LISTING_COLUMNS: &str = "id,is_hidden,hidden_reason";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingRow {
    pub id: ProductId,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub hidden_reason: Option<HiddenReason>,
}
