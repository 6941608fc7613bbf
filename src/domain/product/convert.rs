//! Conversions from wire rows to products.

use super::wire::ProductRow;
use super::{HistoricalPrice, PriceStats, Product};
use crate::domain::price_history::wire::PriceRow;
use chrono::{DateTime, Utc};

impl From<PriceRow> for HistoricalPrice {
    fn from(row: PriceRow) -> Self {
        Self {
            price: row.price,
            check_count: row.check_count,
        }
    }
}

impl Product {
    /// Joins a product row with its latest price figures.
    pub fn from_row(row: ProductRow, stats: PriceStats, last_updated: Option<DateTime<Utc>>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            website: row.website,
            link: row.product_link,
            is_hidden: row.is_hidden,
            hidden_reason: row.hidden_reason,
            hidden_at: row.hidden_at,
            current_price: stats.current,
            previous_price: stats.previous,
            weighted_average: stats.weighted_average,
            last_updated,
        }
    }
}

/// When a price row was last seen by a scraper.
pub(crate) fn last_seen(row: &PriceRow) -> Option<DateTime<Utc>> {
    row.last_checked_at.or(row.price_changed_at).or(row.collected_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{ProductId, Website};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    #[test]
    fn test_from_row() {
        let row = ProductRow {
            id: ProductId::from("3"),
            name: "Fonte 650W".to_string(),
            category: "fonte".to_string(),
            website: Website::Terabyte,
            product_link: Some("https://www.terabyteshop.com.br/produto/3".to_string()),
            is_hidden: false,
            hidden_reason: None,
            hidden_at: None,
        };
        let stats = PriceStats::from_history(
            Decimal::from(400),
            &[HistoricalPrice {
                price: Decimal::from(500),
                check_count: Some(2),
            }],
        );
        let p = Product::from_row(row, stats, None);
        assert_eq!(p.current_price, Decimal::from(400));
        assert_eq!(p.previous_price, Decimal::from(500));
        assert_eq!(p.weighted_average, Decimal::from(500));
        assert_eq!(p.link.as_deref(), Some("https://www.terabyteshop.com.br/produto/3"));
    }

    #[test]
    fn test_last_seen_prefers_last_check() {
        let checked = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let changed = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let row = PriceRow {
            product_id: None,
            price: Decimal::ONE,
            collected_at: None,
            price_changed_at: Some(changed),
            last_checked_at: Some(checked),
            check_count: None,
        };
        assert_eq!(last_seen(&row), Some(checked));
    }
}
