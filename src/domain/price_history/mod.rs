//! Price history domain: timeline resampling and chart geometry.
//!
//! Raw price rows are irregular: the scrapers only write a row when a price
//! changes. The chart needs a fixed cadence, so observations are resampled onto
//! a grid (`resample`), turned into SVG paths (`geometry`), and bundled with
//! min/current/max figures (`chart`).

#[cfg(feature = "http")]
pub mod client;
pub mod chart;
mod convert;
pub mod geometry;
pub mod resample;
pub mod state;
pub mod wire;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use chart::{ChartData, PriceChart, PriceSummary};
pub use convert::MissingTimestamp;
pub use geometry::{CanvasConfig, Path, PathBuilder, PathCommand, PathGeometry, Point};
pub use resample::{resample, ResampleConfig, Resampler};
pub use state::PriceHistoryState;

/// A recorded price at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PriceObservation {
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// One point of a resampled chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    /// Generated from the interval grid rather than read from storage.
    pub is_fixed_grid_point: bool,
    /// Backed by (or close to) a real recorded price change.
    pub is_actual_change: bool,
}
