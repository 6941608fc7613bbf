//! Wire types for dashboard counts.

use crate::shared::Website;
use serde::Deserialize;

/// Price rows joined to their product, for per-website counting.
pub const PRICE_ACTIVITY_COLUMNS: &str = "product_id,products!inner(website)";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebsiteRow {
    pub website: Website,
}
