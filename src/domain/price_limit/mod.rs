//! Category price limits: hide listings priced at or above a per-category cap.

#[cfg(feature = "http")]
pub mod client;
pub mod wire;

use crate::domain::price_history::wire::PriceRow;
use crate::domain::product::HiddenReason;
use crate::shared::serde_util;
use crate::shared::{ProductId, RowId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPriceLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub category: String,
    #[serde(with = "serde_util::decimal")]
    pub max_price: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceLimitError {
    EmptyCategory,
    NonPositiveMaxPrice(Decimal),
}

impl fmt::Display for PriceLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceLimitError::EmptyCategory => write!(f, "Price limit category is required"),
            PriceLimitError::NonPositiveMaxPrice(p) => {
                write!(f, "Price limit must be greater than zero, got {}", p)
            }
        }
    }
}

impl std::error::Error for PriceLimitError {}

/// Create-or-replace request for a category limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLimitUpsert {
    pub category: String,
    pub max_price: Decimal,
    pub is_active: bool,
}

impl PriceLimitUpsert {
    pub fn new(category: impl Into<String>, max_price: Decimal) -> Self {
        Self {
            category: category.into(),
            max_price,
            is_active: true,
        }
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn validate(&self) -> Result<(), PriceLimitError> {
        if self.category.trim().is_empty() {
            return Err(PriceLimitError::EmptyCategory);
        }
        if self.max_price <= Decimal::ZERO {
            return Err(PriceLimitError::NonPositiveMaxPrice(self.max_price));
        }
        Ok(())
    }
}

// ─── Enforcement ─────────────────────────────────────────────────────────────

/// A product's visibility and latest price, as seen by enforcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPrice {
    pub product_id: ProductId,
    pub is_hidden: bool,
    pub hidden_reason: Option<HiddenReason>,
    pub price: Decimal,
}

/// Visibility changes produced by one limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enforcement {
    pub hide: Vec<ProductId>,
    pub show: Vec<ProductId>,
}

impl Enforcement {
    pub fn is_empty(&self) -> bool {
        self.hide.is_empty() && self.show.is_empty()
    }
}

/// Visible listings at or above `max_price` are hidden; listings hidden by a
/// limit that are now below it are shown. Products hidden for any other
/// reason are left alone.
pub fn enforce(max_price: Decimal, listings: &[ListingPrice]) -> Enforcement {
    let mut out = Enforcement::default();
    for listing in listings {
        let limit_hidden =
            listing.is_hidden && listing.hidden_reason == Some(HiddenReason::PriceLimitExceeded);
        if listing.is_hidden && !limit_hidden {
            continue;
        }
        let above = listing.price >= max_price;
        if above && !listing.is_hidden {
            out.hide.push(listing.product_id.clone());
        } else if !above && limit_hidden {
            out.show.push(listing.product_id.clone());
        }
    }
    out
}

/// Reduce price rows to the newest per product (by `price_changed_at`, then
/// `collected_at`). Rows without a product id are skipped.
pub fn latest_per_product(rows: Vec<PriceRow>) -> BTreeMap<ProductId, PriceRow> {
    let mut latest: BTreeMap<ProductId, PriceRow> = BTreeMap::new();
    for row in rows {
        let Some(id) = row.product_id.clone() else {
            continue;
        };
        let newer = match latest.get(&id) {
            Some(existing) => changed_at(&row) > changed_at(existing),
            None => true,
        };
        if newer {
            latest.insert(id, row);
        }
    }
    latest
}

fn changed_at(row: &PriceRow) -> Option<DateTime<Utc>> {
    row.price_changed_at.or(row.collected_at)
}

/// Product categories that have no limit configured, sorted and distinct.
pub fn missing_categories(
    limits: &[CategoryPriceLimit],
    product_categories: &[String],
) -> Vec<String> {
    let configured: BTreeSet<&str> = limits.iter().map(|l| l.category.as_str()).collect();
    product_categories
        .iter()
        .filter(|c| !configured.contains(c.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
