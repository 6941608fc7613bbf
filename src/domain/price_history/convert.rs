//! Conversions from wire rows to observations.

use super::wire::PriceRow;
use super::PriceObservation;
use std::fmt;

/// A `prices` row carried none of the timestamp columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTimestamp;

impl fmt::Display for MissingTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "price row has no timestamp")
    }
}

impl std::error::Error for MissingTimestamp {}

impl TryFrom<PriceRow> for PriceObservation {
    type Error = MissingTimestamp;

    /// Prefers the moment the price changed over the moment it was collected.
    fn try_from(row: PriceRow) -> Result<Self, Self::Error> {
        let timestamp = row
            .price_changed_at
            .or(row.collected_at)
            .or(row.last_checked_at)
            .ok_or(MissingTimestamp)?;
        Ok(PriceObservation::new(timestamp, row.price))
    }
}

/// Converts rows, skipping those without a usable timestamp.
pub(crate) fn observations_from_rows(rows: Vec<PriceRow>) -> Vec<PriceObservation> {
    let total = rows.len();
    let observations: Vec<PriceObservation> = rows
        .into_iter()
        .filter_map(|row| PriceObservation::try_from(row).ok())
        .collect();
    if observations.len() < total {
        tracing::debug!(
            skipped = total - observations.len(),
            "price rows without timestamp skipped"
        );
    }
    observations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn row() -> PriceRow {
        PriceRow {
            product_id: None,
            price: Decimal::new(12990, 2),
            collected_at: None,
            price_changed_at: None,
            last_checked_at: None,
            check_count: None,
        }
    }

    #[test]
    fn test_prefers_price_changed_at() {
        let changed = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let collected = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let obs = PriceObservation::try_from(PriceRow {
            collected_at: Some(collected),
            price_changed_at: Some(changed),
            ..row()
        })
        .unwrap();
        assert_eq!(obs.timestamp, changed);
        assert_eq!(obs.price, Decimal::new(12990, 2));
    }

    #[test]
    fn test_falls_back_to_collected_at() {
        let collected = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let obs = PriceObservation::try_from(PriceRow {
            collected_at: Some(collected),
            ..row()
        })
        .unwrap();
        assert_eq!(obs.timestamp, collected);
    }

    #[test]
    fn test_missing_timestamp() {
        assert_eq!(PriceObservation::try_from(row()), Err(MissingTimestamp));
    }

    #[test]
    fn test_rows_without_timestamp_are_skipped() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let rows = vec![
            row(),
            PriceRow {
                collected_at: Some(t),
                ..row()
            },
        ];
        assert_eq!(observations_from_rows(rows).len(), 1);
    }
}
