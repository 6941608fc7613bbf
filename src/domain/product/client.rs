//! Products sub-client: listings, visibility, deletion.

use super::convert::last_seen;
use super::wire::{IdRow, ProductRow, VisibilityPatch, PRICES_TABLE, PRODUCTS_TABLE, PRODUCT_COLUMNS};
use super::{HiddenReason, HistoricalPrice, PriceStats, Product, Promotion, PromotionRules, HISTORY_SAMPLE};
use crate::client::PcScraperClient;
use crate::domain::price_history::wire::PriceRow;
use crate::domain::price_limit::latest_per_product;
use crate::error::{HttpError, SdkError};
use crate::http::Query;
use crate::shared::ProductId;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Ids per `in.(...)` filter, to keep URLs short.
const ID_CHUNK: usize = 100;

/// Sub-client for product operations.
pub struct Products<'a> {
    pub(crate) client: &'a PcScraperClient,
}

impl<'a> Products<'a> {
    /// Priced products with their statistics. Products without a positive
    /// latest price are left out.
    pub async fn list(&self, include_hidden: bool) -> Result<Vec<Product>, SdkError> {
        let mut query = Query::new().select(PRODUCT_COLUMNS);
        if !include_hidden {
            query = query.eq("is_hidden", false);
        }
        let rows: Vec<ProductRow> = self.client.http.select(PRODUCTS_TABLE, &query).await?;
        let ids: Vec<ProductId> = rows.iter().map(|r| r.id.clone()).collect();
        let latest = self.latest_prices(&ids).await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(price_row) = latest.get(&row.id) else {
                continue;
            };
            if price_row.price <= Decimal::ZERO {
                continue;
            }
            let history = self.history(&row.id, price_row.price).await?;
            let stats = PriceStats::from_history(price_row.price, &history);
            products.push(Product::from_row(row, stats, last_seen(price_row)));
        }

        tracing::debug!(count = products.len(), include_hidden, "listed products");
        Ok(products)
    }

    /// Hidden products with their latest price, most recently hidden first.
    pub async fn hidden(&self) -> Result<Vec<Product>, SdkError> {
        let query = Query::new()
            .select(PRODUCT_COLUMNS)
            .eq("is_hidden", true)
            .order("hidden_at", false);
        let rows: Vec<ProductRow> = self.client.http.select(PRODUCTS_TABLE, &query).await?;
        let ids: Vec<ProductId> = rows.iter().map(|r| r.id.clone()).collect();
        let latest = self.latest_prices(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let price_row = latest.get(&row.id);
                let current = price_row.map(|p| p.price).unwrap_or(Decimal::ZERO);
                let seen = price_row.and_then(last_seen);
                Product::from_row(row, PriceStats::flat(current), seen)
            })
            .collect())
    }

    /// Current promotions, best first.
    pub async fn promotions(&self) -> Result<Vec<Promotion>, SdkError> {
        let products = self.list(false).await?;
        Ok(PromotionRules::default().top_drops(&products))
    }

    /// Hide (reason `manual`) or show a product.
    pub async fn set_hidden(&self, id: &ProductId, hidden: bool) -> Result<ProductRow, SdkError> {
        let patch = if hidden {
            VisibilityPatch::hide(HiddenReason::Manual, Utc::now())
        } else {
            VisibilityPatch::show()
        };
        let query = Query::new().eq("id", id).select(PRODUCT_COLUMNS);
        let updated: Vec<ProductRow> = self
            .client
            .http
            .update(PRODUCTS_TABLE, &query, &patch)
            .await?;

        let row = updated.into_iter().next().ok_or_else(|| {
            SdkError::Http(HttpError::NotFound(format!("Product not found: {}", id)))
        })?;
        tracing::info!(product_id = %id, hidden, "product visibility changed");
        Ok(row)
    }

    /// Show every hidden product regardless of reason. Returns how many changed.
    pub async fn show_all_hidden(&self) -> Result<usize, SdkError> {
        let query = Query::new().eq("is_hidden", true).select("id");
        let shown: Vec<IdRow> = self
            .client
            .http
            .update(PRODUCTS_TABLE, &query, &VisibilityPatch::show())
            .await?;
        tracing::info!(count = shown.len(), "all hidden products shown");
        Ok(shown.len())
    }

    /// Delete a product and its price history.
    pub async fn delete(&self, id: &ProductId) -> Result<(), SdkError> {
        let _: Vec<serde_json::Value> = self
            .client
            .http
            .delete(PRICES_TABLE, &Query::new().eq("product_id", id))
            .await?;
        let deleted: Vec<IdRow> = self
            .client
            .http
            .delete(PRODUCTS_TABLE, &Query::new().eq("id", id).select("id"))
            .await?;
        if deleted.is_empty() {
            return Err(SdkError::Http(HttpError::NotFound(format!(
                "Product not found: {}",
                id
            ))));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Newest price row per product.
    pub async fn latest_prices(
        &self,
        ids: &[ProductId],
    ) -> Result<BTreeMap<ProductId, PriceRow>, SdkError> {
        let mut rows: Vec<PriceRow> = Vec::new();
        for chunk in ids.chunks(ID_CHUNK) {
            let query = Query::new()
                .select("product_id,price,collected_at,price_changed_at,last_checked_at")
                .in_list("product_id", chunk)
                .order("price_changed_at", false);
            let mut batch: Vec<PriceRow> = self.client.http.select(PRICES_TABLE, &query).await?;
            rows.append(&mut batch);
        }
        Ok(latest_per_product(rows))
    }

    async fn history(
        &self,
        id: &ProductId,
        current: Decimal,
    ) -> Result<Vec<HistoricalPrice>, SdkError> {
        let query = Query::new()
            .select("price,check_count")
            .eq("product_id", id)
            .neq("price", current)
            .order("price_changed_at", false)
            .limit(HISTORY_SAMPLE);
        let rows: Vec<PriceRow> = self.client.http.select(PRICES_TABLE, &query).await?;
        Ok(rows.into_iter().map(HistoricalPrice::from).collect())
    }
}
