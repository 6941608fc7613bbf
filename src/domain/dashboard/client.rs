//! Dashboard sub-client: per-website scrape activity.

use super::wire::{WebsiteRow, PRICE_ACTIVITY_COLUMNS};
use super::{DashboardStats, WebsiteStats};
use crate::client::PcScraperClient;
use crate::domain::product::wire::{PRICES_TABLE, PRODUCTS_TABLE};
use crate::error::SdkError;
use crate::http::Query;
use crate::shared::Website;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::collections::BTreeSet;

/// Sub-client for scraper health.
pub struct Dashboard<'a> {
    pub(crate) client: &'a PcScraperClient,
}

impl<'a> Dashboard<'a> {
    pub async fn stats(&self) -> Result<DashboardStats, SdkError> {
        let now = Utc::now();
        let disabled = &self.client.disabled_websites;

        let rows: Vec<WebsiteRow> = self
            .client
            .http
            .select(
                PRODUCTS_TABLE,
                &Query::new().select("website").eq("is_hidden", false),
            )
            .await?;
        let websites: BTreeSet<Website> = rows
            .into_iter()
            .map(|r| r.website)
            .filter(|w| !disabled.contains(w))
            .collect();

        let mut stats = Vec::with_capacity(websites.len());
        for website in websites {
            let recent = self
                .checked_since(&website, now - Duration::minutes(30))
                .await?;
            let day = self.checked_since(&website, now - Duration::hours(24)).await?;
            let entry = WebsiteStats::new(website, recent, day);
            tracing::debug!(
                website = %entry.website,
                recent,
                average = entry.average_per_30m,
                status = %entry.status,
                "scraper status"
            );
            stats.push(entry);
        }

        Ok(DashboardStats::assemble(stats, disabled, now))
    }

    /// Price rows of visible products on `website` checked since `since`.
    async fn checked_since(&self, website: &Website, since: DateTime<Utc>) -> Result<u64, SdkError> {
        let query = Query::new()
            .select(PRICE_ACTIVITY_COLUMNS)
            .gte(
                "last_checked_at",
                since.to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .eq("products.website", website)
            .eq("products.is_hidden", false);
        let rows: Vec<serde_json::Value> = self.client.http.select(PRICES_TABLE, &query).await?;
        Ok(rows.len() as u64)
    }
}
