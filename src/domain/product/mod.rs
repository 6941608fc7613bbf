//! Product domain: listings, price statistics, promotions.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::shared::fmt::decimal::{brl, signed_pct};
use crate::shared::{ProductId, Website};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Recent price changes read when computing [`PriceStats`].
pub const HISTORY_SAMPLE: usize = 10;

// ─── HiddenReason ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenReason {
    Manual,
    PriceLimitExceeded,
    #[serde(other)]
    Other,
}

impl HiddenReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            HiddenReason::Manual => "manual",
            HiddenReason::PriceLimitExceeded => "price_limit_exceeded",
            HiddenReason::Other => "other",
        }
    }
}

impl std::fmt::Display for HiddenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── PriceStats ──────────────────────────────────────────────────────────────

/// A past price and how many scrapes observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalPrice {
    pub price: Decimal,
    pub check_count: Option<i64>,
}

impl HistoricalPrice {
    fn weight(&self) -> Decimal {
        Decimal::from(self.check_count.unwrap_or(1).max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceStats {
    pub current: Decimal,
    pub previous: Decimal,
    pub weighted_average: Decimal,
    pub change_pct: Decimal,
}

impl PriceStats {
    /// `history` is newest first. Rows at the current price are ignored; the
    /// first remaining row is the previous price, and the average weights each
    /// row by its check count (at least 1).
    pub fn from_history(current: Decimal, history: &[HistoricalPrice]) -> Self {
        let past: Vec<&HistoricalPrice> =
            history.iter().filter(|h| h.price != current).collect();

        let previous = past.first().map(|h| h.price).unwrap_or(current);

        let total_weight: Decimal = past.iter().map(|h| h.weight()).sum();
        let weighted_average = if total_weight > Decimal::ZERO {
            past.iter().map(|h| h.price * h.weight()).sum::<Decimal>() / total_weight
        } else {
            current
        };

        let change_pct = if previous > Decimal::ZERO {
            (current - previous) / previous * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        Self {
            current,
            previous,
            weighted_average,
            change_pct,
        }
    }

    /// No history: every figure is the current price.
    pub fn flat(current: Decimal) -> Self {
        Self::from_history(current, &[])
    }
}

// ─── Product ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub website: Website,
    pub link: Option<String>,
    pub is_hidden: bool,
    pub hidden_reason: Option<HiddenReason>,
    pub hidden_at: Option<DateTime<Utc>>,
    pub current_price: Decimal,
    pub previous_price: Decimal,
    pub weighted_average: Decimal,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Product {
    pub fn price_change_pct(&self) -> Decimal {
        if self.previous_price > Decimal::ZERO {
            (self.current_price - self.previous_price) / self.previous_price
                * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    /// Discount against the weighted average; zero without usable history.
    pub fn discount_pct(&self) -> Decimal {
        if self.weighted_average.is_zero() || self.weighted_average == self.current_price {
            return Decimal::ZERO;
        }
        (self.weighted_average - self.current_price) / self.weighted_average
            * Decimal::ONE_HUNDRED
    }

    /// Current price as shown on the dashboard: `R$ 1.234,56`.
    pub fn price_label(&self) -> String {
        brl(&self.current_price)
    }

    /// Change against the previous price: `-12,5%`.
    pub fn change_label(&self) -> String {
        signed_pct(&self.price_change_pct())
    }

    /// Apply a realtime price update, keeping the stored previous price.
    pub fn apply_price(&mut self, price: Decimal, at: Option<DateTime<Utc>>) {
        self.current_price = price;
        if at.is_some() {
            self.last_updated = at;
        }
    }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Price,
    Category,
    /// Largest discount first.
    Drop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Search, filter, and sort over an in-memory product list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub search: String,
    pub categories: Vec<String>,
    pub websites: Vec<Website>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn website(mut self, website: impl Into<Website>) -> Self {
        self.websites.push(website.into());
        self
    }

    pub fn sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = key;
        self.order = order;
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        if !self.search.is_empty() {
            let term = self.search.to_lowercase();
            if !product.name.to_lowercase().contains(&term)
                && !product.category.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }
        if !self.websites.is_empty() && !self.websites.contains(&product.website) {
            return false;
        }
        true
    }

    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut out: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            let ord = self.compare(a, b);
            match self.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        out
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self.sort_by {
            SortKey::Price => a.current_price.cmp(&b.current_price),
            SortKey::Category => a
                .category
                .to_lowercase()
                .cmp(&b.category.to_lowercase())
                .then_with(|| a.category.cmp(&b.category)),
            SortKey::Drop => b.discount_pct().cmp(&a.discount_pct()),
        }
    }
}

/// Distinct categories, sorted.
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct websites, sorted by identifier.
pub fn websites(products: &[Product]) -> Vec<Website> {
    let mut out: Vec<Website> = products
        .iter()
        .map(|p| p.website.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    out.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    out
}

// ─── Promotions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionRules {
    pub min_discount_pct: Decimal,
    pub max_discount_pct: Decimal,
    pub min_price: Decimal,
    pub max_results: usize,
}

impl Default for PromotionRules {
    fn default() -> Self {
        Self {
            min_discount_pct: Decimal::from(10),
            max_discount_pct: Decimal::from(80),
            min_price: Decimal::from(20),
            max_results: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionReason {
    Promotion,
    /// No history, or the price sits exactly on its average.
    NoHistory,
    InsufficientDiscount,
    PriceTooLow,
    /// Discounts above the ceiling are usually scraping errors.
    SuspiciousDiscount,
    AboveAverage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionVerdict {
    pub is_promotion: bool,
    pub discount_pct: Decimal,
    pub discount_amount: Decimal,
    /// Rounded, non-negative discount percentage.
    pub score: u32,
    pub reason: PromotionReason,
}

impl PromotionRules {
    pub fn evaluate(&self, product: &Product) -> PromotionVerdict {
        let avg = product.weighted_average;
        let current = product.current_price;

        if avg.is_zero() || avg == current {
            return PromotionVerdict {
                is_promotion: false,
                discount_pct: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                score: 0,
                reason: PromotionReason::NoHistory,
            };
        }

        let discount_pct = (avg - current) / avg * Decimal::ONE_HUNDRED;
        let discount_amount = avg - current;

        let reason = if discount_pct < self.min_discount_pct {
            PromotionReason::InsufficientDiscount
        } else if current < self.min_price {
            PromotionReason::PriceTooLow
        } else if discount_pct > self.max_discount_pct {
            PromotionReason::SuspiciousDiscount
        } else if discount_amount <= Decimal::ZERO {
            PromotionReason::AboveAverage
        } else {
            PromotionReason::Promotion
        };

        let score = discount_pct
            .max(Decimal::ZERO)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0);

        PromotionVerdict {
            is_promotion: reason == PromotionReason::Promotion,
            discount_pct,
            discount_amount,
            score,
            reason,
        }
    }

    /// Promotions by score, highest first, capped at `max_results`.
    pub fn top_drops(&self, products: &[Product]) -> Vec<Promotion> {
        let mut promos: Vec<Promotion> = products
            .iter()
            .filter_map(|p| {
                let verdict = self.evaluate(p);
                verdict.is_promotion.then(|| Promotion {
                    product: p.clone(),
                    verdict,
                })
            })
            .collect();
        promos.sort_by(|a, b| b.verdict.score.cmp(&a.verdict.score));
        promos.truncate(self.max_results);
        promos
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    pub product: Product,
    pub verdict: PromotionVerdict,
}

/// [`PromotionRules::top_drops`] with the default rules.
pub fn top_drops(products: &[Product]) -> Vec<Promotion> {
    PromotionRules::default().top_drops(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(id: &str, category: &str, website: &str, price: &str, avg: &str) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Produto {}", id),
            category: category.to_string(),
            website: Website::from(website),
            link: None,
            is_hidden: false,
            hidden_reason: None,
            hidden_at: None,
            current_price: dec(price),
            previous_price: dec(avg),
            weighted_average: dec(avg),
            last_updated: None,
        }
    }

    fn hist(price: &str, checks: Option<i64>) -> HistoricalPrice {
        HistoricalPrice {
            price: dec(price),
            check_count: checks,
        }
    }

    #[test]
    fn test_labels() {
        let mut p = product("1", "ssd", "kabum", "1099.9", "1250");
        assert_eq!(p.price_label(), "R$ 1.099,90");
        assert_eq!(p.change_label(), "-12,0%");
        p.previous_price = Decimal::ZERO;
        assert_eq!(p.change_label(), "0,0%");
    }

    #[test]
    fn test_stats_without_history() {
        let s = PriceStats::flat(dec("500"));
        assert_eq!(s.previous, dec("500"));
        assert_eq!(s.weighted_average, dec("500"));
        assert_eq!(s.change_pct, Decimal::ZERO);
    }

    #[test]
    fn test_stats_weighted_by_check_count() {
        let s = PriceStats::from_history(
            dec("90"),
            &[hist("100", Some(3)), hist("120", Some(1)), hist("90", Some(50))],
        );
        assert_eq!(s.previous, dec("100"));
        // (100*3 + 120*1) / 4
        assert_eq!(s.weighted_average, dec("105"));
        assert_eq!(s.change_pct, dec("-10"));
    }

    #[test]
    fn test_stats_check_count_floor_is_one() {
        let s = PriceStats::from_history(dec("10"), &[hist("20", Some(0)), hist("40", None)]);
        assert_eq!(s.weighted_average, dec("30"));
    }

    #[test]
    fn test_hidden_reason_serde() {
        let r: HiddenReason = serde_json::from_str("\"price_limit_exceeded\"").unwrap();
        assert_eq!(r, HiddenReason::PriceLimitExceeded);
        let other: HiddenReason = serde_json::from_str("\"weird\"").unwrap();
        assert_eq!(other, HiddenReason::Other);
        assert_eq!(serde_json::to_string(&HiddenReason::Manual).unwrap(), "\"manual\"");
    }

    #[test]
    fn test_query_search_is_case_insensitive() {
        let products = vec![
            product("1", "placa_de_video", "kabum", "2000", "2000"),
            product("2", "processador", "terabyte", "900", "900"),
        ];
        let found = ProductQuery::new().search("PLACA").apply(&products);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "1");

        let by_name = ProductQuery::new().search("produto 2").apply(&products);
        assert_eq!(by_name[0].id.as_str(), "2");
    }

    #[test]
    fn test_query_filters_and_sorts() {
        let products = vec![
            product("1", "ssd", "kabum", "300", "300"),
            product("2", "ssd", "terabyte", "250", "250"),
            product("3", "memoria", "kabum", "150", "150"),
        ];
        let asc = ProductQuery::new().sort(SortKey::Price, SortOrder::Asc).apply(&products);
        let ids: Vec<&str> = asc.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);

        let desc = ProductQuery::new()
            .category("ssd")
            .sort(SortKey::Price, SortOrder::Desc)
            .apply(&products);
        let ids: Vec<&str> = desc.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let kabum = ProductQuery::new().website("kabum").apply(&products);
        assert_eq!(kabum.len(), 2);
    }

    #[test]
    fn test_sort_by_drop_puts_biggest_discount_first() {
        let products = vec![
            product("small", "ssd", "kabum", "95", "100"),
            product("none", "ssd", "kabum", "100", "100"),
            product("big", "ssd", "kabum", "70", "100"),
        ];
        let sorted = ProductQuery::new().sort(SortKey::Drop, SortOrder::Asc).apply(&products);
        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["big", "small", "none"]);
    }

    #[test]
    fn test_distinct_categories_and_websites() {
        let products = vec![
            product("1", "ssd", "terabyte", "1", "1"),
            product("2", "fonte", "kabum", "1", "1"),
            product("3", "ssd", "kabum", "1", "1"),
        ];
        assert_eq!(categories(&products), vec!["fonte", "ssd"]);
        assert_eq!(
            websites(&products),
            vec![Website::Kabum, Website::Terabyte]
        );
    }

    #[test]
    fn test_promotion_verdicts() {
        let rules = PromotionRules::default();
        assert_eq!(
            rules.evaluate(&product("a", "x", "kabum", "100", "100")).reason,
            PromotionReason::NoHistory
        );
        assert_eq!(
            rules.evaluate(&product("b", "x", "kabum", "95", "100")).reason,
            PromotionReason::InsufficientDiscount
        );
        assert_eq!(
            rules.evaluate(&product("c", "x", "kabum", "15", "30")).reason,
            PromotionReason::PriceTooLow
        );
        assert_eq!(
            rules.evaluate(&product("d", "x", "kabum", "100", "1000")).reason,
            PromotionReason::SuspiciousDiscount
        );
        let ok = rules.evaluate(&product("e", "x", "kabum", "850", "1000"));
        assert!(ok.is_promotion);
        assert_eq!(ok.score, 15);
        assert_eq!(ok.discount_amount, dec("150"));
    }

    #[test]
    fn test_price_increase_is_not_a_promotion() {
        let v = PromotionRules::default().evaluate(&product("u", "x", "kabum", "120", "100"));
        assert!(!v.is_promotion);
        assert_eq!(v.score, 0);
    }

    #[test]
    fn test_top_drops_ordering_and_cap() {
        let mut products: Vec<Product> = (0..20)
            .map(|i| product(&i.to_string(), "x", "kabum", &(80 - i).to_string(), "100"))
            .collect();
        products.push(product("skip", "x", "kabum", "100", "100"));
        let top = top_drops(&products);
        assert_eq!(top.len(), 15);
        assert_eq!(top[0].product.id.as_str(), "19");
        assert!(top.windows(2).all(|w| w[0].verdict.score >= w[1].verdict.score));
    }

    #[test]
    fn test_apply_price_keeps_previous() {
        let mut p = product("1", "x", "kabum", "100", "120");
        p.apply_price(dec("90"), None);
        assert_eq!(p.current_price, dec("90"));
        assert_eq!(p.previous_price, dec("120"));
        assert_eq!(p.price_change_pct(), dec("-25"));
    }
}
