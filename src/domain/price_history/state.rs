//! Price history state container: app-owned, SDK-provided update logic.

use super::chart::PriceChart;
use super::PriceObservation;
use crate::shared::{IntervalProfile, ProductId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Cached observations per product and interval.
///
/// The app owns instances of this type and re-renders charts from it without
/// refetching when only `now` moves.
#[derive(Debug, Clone, Default)]
pub struct PriceHistoryState {
    data: HashMap<(ProductId, IntervalProfile), Vec<PriceObservation>>,
}

impl PriceHistoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all observations for this key with a fresh fetch.
    pub fn apply_snapshot(
        &mut self,
        product_id: ProductId,
        profile: IntervalProfile,
        mut observations: Vec<PriceObservation>,
    ) {
        observations.sort_by_key(|o| o.timestamp);
        self.data.insert((product_id, profile), observations);
    }

    pub fn get(
        &self,
        product_id: &ProductId,
        profile: IntervalProfile,
    ) -> Option<&Vec<PriceObservation>> {
        self.data.get(&(product_id.clone(), profile))
    }

    /// Render the cached observations; unknown keys yield `InsufficientData`.
    pub fn chart(
        &self,
        product_id: &ProductId,
        profile: IntervalProfile,
        now: DateTime<Utc>,
    ) -> PriceChart {
        match self.get(product_id, profile) {
            Some(observations) => PriceChart::build(observations, profile, now),
            None => PriceChart::InsufficientData,
        }
    }

    pub fn remove(&mut self, product_id: &ProductId) {
        self.data.retain(|(id, _), _| id != product_id);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
