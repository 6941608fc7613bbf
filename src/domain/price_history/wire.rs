//! Wire types for price history (`prices` table rows).

use crate::shared::serde_util;
use crate::shared::ProductId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Columns selected by the history query.
pub const PRICE_HISTORY_COLUMNS: &str = "price,collected_at,price_changed_at";

/// A row of the `prices` table. Scrapers write a row per price change and
/// bump `last_checked_at`/`check_count` while the price holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(with = "serde_util::decimal")]
    pub price: Decimal,
    #[serde(default)]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price_changed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_count: Option<i64>,
}
