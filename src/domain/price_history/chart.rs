//! Chart assembly: resampled series, summary figures, and paths in one value.

use super::geometry::{CanvasConfig, PathBuilder, PathGeometry};
use super::resample::{ResampleConfig, Resampler};
use super::{PriceObservation, TimelinePoint};
use crate::shared::IntervalProfile;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Lowest, latest, and highest price of a rendered series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSummary {
    pub min: Decimal,
    pub current: Decimal,
    pub max: Decimal,
}

impl PriceSummary {
    /// `None` for an empty series.
    pub fn from_points(points: &[TimelinePoint]) -> Option<Self> {
        let current = points.last()?.price;
        let (min, max) = points.iter().fold((current, current), |(lo, hi), p| {
            (lo.min(p.price), hi.max(p.price))
        });
        Some(Self { min, current, max })
    }

    /// Distance from the lowest price, as a percentage of it.
    pub fn above_min_pct(&self) -> Option<Decimal> {
        if self.min.is_zero() {
            return None;
        }
        Some((self.current - self.min) / self.min * Decimal::ONE_HUNDRED)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub points: Vec<TimelinePoint>,
    pub summary: PriceSummary,
    pub geometry: PathGeometry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceChart {
    /// No observations; render the "no history" placeholder.
    InsufficientData,
    Ready(ChartData),
}

impl PriceChart {
    pub fn build(
        observations: &[PriceObservation],
        profile: IntervalProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self::build_with(
            observations,
            profile,
            now,
            ResampleConfig::default(),
            CanvasConfig::default(),
        )
    }

    pub fn build_with(
        observations: &[PriceObservation],
        profile: IntervalProfile,
        now: DateTime<Utc>,
        resample: ResampleConfig,
        canvas: CanvasConfig,
    ) -> Self {
        let points = Resampler::with_config(resample).resample(observations, profile, now);
        let Some(summary) = PriceSummary::from_points(&points) else {
            return PriceChart::InsufficientData;
        };
        let geometry = PathBuilder::with_config(canvas).build(&points);
        PriceChart::Ready(ChartData {
            points,
            summary,
            geometry,
        })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PriceChart::Ready(_))
    }

    pub fn data(&self) -> Option<&ChartData> {
        match self {
            PriceChart::Ready(data) => Some(data),
            PriceChart::InsufficientData => None,
        }
    }
}
