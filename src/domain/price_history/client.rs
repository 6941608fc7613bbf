//! Price history sub-client: observation queries and chart rendering.

use super::chart::PriceChart;
use super::convert::observations_from_rows;
use super::wire::{PriceRow, PRICE_HISTORY_COLUMNS};
use super::PriceObservation;
use crate::client::PcScraperClient;
use crate::domain::product::wire::PRICES_TABLE;
use crate::error::SdkError;
use crate::http::Query;
use crate::shared::{IntervalProfile, ProductId};
use chrono::{DateTime, SecondsFormat, Utc};

/// Sub-client for price history operations.
pub struct PriceHistoryClient<'a> {
    pub(crate) client: &'a PcScraperClient,
}

impl<'a> PriceHistoryClient<'a> {
    /// Price changes inside the profile's lookback window plus the last
    /// change before it, oldest first.
    pub async fn observations(
        &self,
        product_id: &ProductId,
        profile: IntervalProfile,
    ) -> Result<Vec<PriceObservation>, SdkError> {
        self.observations_at(product_id, profile, Utc::now()).await
    }

    /// Fetch and render a chart against the current time.
    pub async fn chart(
        &self,
        product_id: &ProductId,
        profile: IntervalProfile,
    ) -> Result<PriceChart, SdkError> {
        let now = Utc::now();
        let observations = self.observations_at(product_id, profile, now).await?;
        Ok(PriceChart::build(&observations, profile, now))
    }

    async fn observations_at(
        &self,
        product_id: &ProductId,
        profile: IntervalProfile,
        now: DateTime<Utc>,
    ) -> Result<Vec<PriceObservation>, SdkError> {
        let window: Vec<PriceRow> = self
            .client
            .http
            .select(PRICES_TABLE, &window_query(product_id, profile, now))
            .await?;
        let seed: Vec<PriceRow> = self
            .client
            .http
            .select(PRICES_TABLE, &seed_query(product_id, profile, now))
            .await?;
        tracing::debug!(
            product_id = %product_id,
            interval = %profile,
            rows = window.len(),
            seeded = !seed.is_empty(),
            "fetched price history"
        );
        Ok(history_from_rows(window, seed))
    }
}

fn cutoff(profile: IntervalProfile, now: DateTime<Utc>) -> String {
    (now - profile.lookback_window()).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Newest changes inside the window; the row cap drops the oldest.
fn window_query(product_id: &ProductId, profile: IntervalProfile, now: DateTime<Utc>) -> Query {
    Query::new()
        .select(PRICE_HISTORY_COLUMNS)
        .eq("product_id", product_id)
        .gte("price_changed_at", cutoff(profile, now))
        .order("price_changed_at", false)
        .limit(profile.max_points())
}

/// The last change before the window, used to forward-fill early grid points.
fn seed_query(product_id: &ProductId, profile: IntervalProfile, now: DateTime<Utc>) -> Query {
    Query::new()
        .select(PRICE_HISTORY_COLUMNS)
        .eq("product_id", product_id)
        .lt("price_changed_at", cutoff(profile, now))
        .order("price_changed_at", false)
        .limit(1)
}

fn history_from_rows(window: Vec<PriceRow>, seed: Vec<PriceRow>) -> Vec<PriceObservation> {
    let mut observations = observations_from_rows(seed.into_iter().chain(window).collect());
    observations.sort_by_key(|o| o.timestamp);
    observations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn row(at: DateTime<Utc>, price: i64) -> PriceRow {
        PriceRow {
            product_id: None,
            price: Decimal::from(price),
            collected_at: None,
            price_changed_at: Some(at),
            last_checked_at: None,
            check_count: None,
        }
    }

    #[test]
    fn test_window_query_keeps_newest_rows() {
        let q = window_query(&ProductId::from("42"), IntervalProfile::Hour1, now());
        assert_eq!(
            q.to_query_string(),
            "select=price%2Ccollected_at%2Cprice_changed_at\
             &product_id=eq.42\
             &price_changed_at=gte.2025-03-09T12%3A00%3A00.000Z\
             &order=price_changed_at.desc\
             &limit=48"
        );
    }

    #[test]
    fn test_seed_query_takes_last_change_before_window() {
        let q = seed_query(&ProductId::from("42"), IntervalProfile::Day1, now());
        assert_eq!(
            q.to_query_string(),
            "select=price%2Ccollected_at%2Cprice_changed_at\
             &product_id=eq.42\
             &price_changed_at=lt.2025-02-08T12%3A00%3A00.000Z\
             &order=price_changed_at.desc\
             &limit=1"
        );
    }

    #[test]
    fn test_history_is_oldest_first_with_seed() {
        let window = vec![
            row(now() - Duration::hours(1), 900),
            row(now() - Duration::hours(5), 950),
        ];
        let seed = vec![row(now() - Duration::days(10), 1000)];
        let history = history_from_rows(window, seed);
        let prices: Vec<Decimal> = history.iter().map(|o| o.price).collect();
        assert_eq!(
            prices,
            vec![Decimal::from(1000), Decimal::from(950), Decimal::from(900)]
        );
    }

    #[test]
    fn test_price_older_than_window_still_charts() {
        let history = history_from_rows(Vec::new(), vec![row(now() - Duration::days(10), 1000)]);
        let chart = PriceChart::build(&history, IntervalProfile::Hour1, now());
        let data = chart.data().expect("seeded history renders");
        assert_eq!(data.points.len(), IntervalProfile::Hour1.bucket_count());
        assert!(data.points.iter().all(|p| p.price == Decimal::from(1000)));
    }
}
