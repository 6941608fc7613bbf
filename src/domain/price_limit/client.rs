//! Price limits sub-client: CRUD plus visibility enforcement.

use super::wire::{LimitActivePatch, LimitUpsertBody, ListingRow, LIMITS_TABLE, LISTING_COLUMNS};
use super::{enforce, missing_categories, CategoryPriceLimit, Enforcement, ListingPrice, PriceLimitUpsert};
use crate::client::PcScraperClient;
use crate::domain::product::wire::{IdRow, VisibilityPatch, PRODUCTS_TABLE};
use crate::domain::product::HiddenReason;
use crate::error::{HttpError, SdkError};
use crate::http::Query;
use crate::shared::{ProductId, RowId};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Sub-client for category price limits.
pub struct PriceLimits<'a> {
    pub(crate) client: &'a PcScraperClient,
}

impl<'a> PriceLimits<'a> {
    /// All limits, by category.
    pub async fn list(&self) -> Result<Vec<CategoryPriceLimit>, SdkError> {
        let query = Query::new().select("*").order("category", true);
        Ok(self.client.http.select(LIMITS_TABLE, &query).await?)
    }

    /// Product categories with no limit configured.
    pub async fn missing(&self) -> Result<Vec<String>, SdkError> {
        #[derive(Deserialize)]
        struct CategoryRow {
            category: String,
        }

        let limits = self.list().await?;
        let rows: Vec<CategoryRow> = self
            .client
            .http
            .select(PRODUCTS_TABLE, &Query::new().select("category"))
            .await?;
        let categories: Vec<String> = rows.into_iter().map(|r| r.category).collect();
        Ok(missing_categories(&limits, &categories))
    }

    /// Create or replace a limit. Active limits are enforced immediately.
    pub async fn upsert(&self, request: PriceLimitUpsert) -> Result<CategoryPriceLimit, SdkError> {
        request.validate()?;

        let body = LimitUpsertBody {
            category: request.category.clone(),
            max_price: request.max_price,
            is_active: request.is_active,
            updated_at: Utc::now(),
        };
        let saved: Vec<CategoryPriceLimit> =
            self.client.http.upsert(LIMITS_TABLE, &body, "category").await?;
        let limit = saved.into_iter().next().ok_or_else(|| {
            SdkError::Other(format!("Upsert returned no row for '{}'", request.category))
        })?;

        if limit.is_active {
            self.enforce_category(&limit.category, limit.max_price).await?;
        }
        Ok(limit)
    }

    /// Remove a limit and show the products it had hidden. Returns how many
    /// products became visible.
    pub async fn delete(&self, category: &str) -> Result<usize, SdkError> {
        let deleted: Vec<CategoryPriceLimit> = self
            .client
            .http
            .delete(LIMITS_TABLE, &Query::new().eq("category", category))
            .await?;
        if deleted.is_empty() {
            return Err(SdkError::Http(HttpError::NotFound(format!(
                "No price limit for category: {}",
                category
            ))));
        }

        let query = Query::new()
            .eq("category", category)
            .eq("hidden_reason", HiddenReason::PriceLimitExceeded)
            .select("id");
        let shown: Vec<IdRow> = self
            .client
            .http
            .update(PRODUCTS_TABLE, &query, &VisibilityPatch::show())
            .await?;
        tracing::info!(category, shown = shown.len(), "price limit removed");
        Ok(shown.len())
    }

    /// Activate or deactivate every limit. Activating enforces each one;
    /// deactivating shows every product hidden by a limit. Returns how many
    /// limits changed.
    pub async fn set_all_active(&self, active: bool) -> Result<usize, SdkError> {
        let limits = self.list().await?;
        let ids: Vec<RowId> = limits.iter().filter_map(|l| l.id.clone()).collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let patch = LimitActivePatch {
            is_active: active,
            updated_at: Utc::now(),
        };
        let updated: Vec<CategoryPriceLimit> = self
            .client
            .http
            .update(LIMITS_TABLE, &Query::new().in_list("id", &ids), &patch)
            .await?;

        if active {
            for limit in &limits {
                self.enforce_category(&limit.category, limit.max_price).await?;
            }
        } else {
            let query = Query::new()
                .eq("is_hidden", true)
                .eq("hidden_reason", HiddenReason::PriceLimitExceeded)
                .select("id");
            let shown: Vec<IdRow> = self
                .client
                .http
                .update(PRODUCTS_TABLE, &query, &VisibilityPatch::show())
                .await?;
            tracing::info!(shown = shown.len(), "limit-hidden products shown");
        }

        tracing::info!(count = updated.len(), active, "price limits toggled");
        Ok(updated.len())
    }

    /// Apply one limit to its category's latest prices.
    pub async fn enforce_category(
        &self,
        category: &str,
        max_price: Decimal,
    ) -> Result<Enforcement, SdkError> {
        let query = Query::new()
            .select(LISTING_COLUMNS)
            .eq("category", category);
        let rows: Vec<ListingRow> = self.client.http.select(PRODUCTS_TABLE, &query).await?;
        let ids: Vec<ProductId> = rows.iter().map(|r| r.id.clone()).collect();
        let latest = self.client.products().latest_prices(&ids).await?;

        let listings: Vec<ListingPrice> = rows
            .into_iter()
            .filter_map(|row| {
                let price = latest.get(&row.id)?.price;
                Some(ListingPrice {
                    product_id: row.id,
                    is_hidden: row.is_hidden,
                    hidden_reason: row.hidden_reason,
                    price,
                })
            })
            .collect();

        let plan = enforce(max_price, &listings);

        if !plan.hide.is_empty() {
            let patch = VisibilityPatch::hide(HiddenReason::PriceLimitExceeded, Utc::now());
            let _: Vec<IdRow> = self
                .client
                .http
                .update(
                    PRODUCTS_TABLE,
                    &Query::new().in_list("id", &plan.hide).select("id"),
                    &patch,
                )
                .await?;
        }
        if !plan.show.is_empty() {
            let _: Vec<IdRow> = self
                .client
                .http
                .update(
                    PRODUCTS_TABLE,
                    &Query::new().in_list("id", &plan.show).select("id"),
                    &VisibilityPatch::show(),
                )
                .await?;
        }

        tracing::info!(
            category,
            hidden = plan.hide.len(),
            shown = plan.show.len(),
            "price limit enforced"
        );
        Ok(plan)
    }
}
