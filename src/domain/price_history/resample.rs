//! Timeline resampling: sparse price changes onto a fixed display grid.
//!
//! The pipeline is `sort → partition → grid → merge → dedupe → fill → flag →
//! filter`. Each stage takes and returns an owned, time-ordered `Vec`.
//!
//! Tolerances scale with the interval's bucket duration so the same rules work
//! for hourly and weekly charts alike.

use super::{PriceObservation, TimelinePoint};
use crate::shared::IntervalProfile;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

/// Tunable ratios, relative to the profile's bucket duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleConfig {
    /// A candidate within `bucket * dedupe_ratio` of an accepted point is dropped.
    pub dedupe_ratio: f64,
    /// A grid point within `bucket * near_change_ratio` of a real observation
    /// is flagged as an actual change.
    pub near_change_ratio: f64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            dedupe_ratio: 0.05,
            near_change_ratio: 0.15,
        }
    }
}

/// Resamples observations for one interval profile.
#[derive(Debug, Clone, Default)]
pub struct Resampler {
    config: ResampleConfig,
}

/// Resample with the default tolerances.
pub fn resample(
    observations: &[PriceObservation],
    profile: IntervalProfile,
    now: DateTime<Utc>,
) -> Vec<TimelinePoint> {
    Resampler::default().resample(observations, profile, now)
}

impl Resampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ResampleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Produce the chart series covering `profile`'s lookback window, anchored at `now`.
    ///
    /// Empty input yields an empty series. Otherwise every returned point has a
    /// price, timestamps strictly increase, and no two points are within the
    /// dedupe tolerance of each other.
    pub fn resample(
        &self,
        observations: &[PriceObservation],
        profile: IntervalProfile,
        now: DateTime<Utc>,
    ) -> Vec<TimelinePoint> {
        let sorted = sort_observations(observations);
        if sorted.is_empty() {
            return Vec::new();
        }

        let bucket = profile.bucket_duration();
        let cutoff = now - profile.lookback_window();
        let relevant = within_window(&sorted, cutoff);
        let seed = if relevant.is_empty() {
            forward_fill_seed(&sorted, cutoff)
        } else {
            None
        };

        let candidates = merge(grid_timestamps(profile, now), &relevant);
        let deduped = dedupe(candidates, scale(bucket, self.config.dedupe_ratio));
        let filled = fill(deduped, &relevant, seed, &sorted);
        let flagged = flag_near_changes(
            filled,
            &relevant,
            scale(bucket, self.config.near_change_ratio),
        );

        let points: Vec<TimelinePoint> = flagged
            .into_iter()
            .filter_map(Candidate::into_point)
            .collect();

        if points.is_empty() {
            // Data exists but nothing resolved: show a flat line, not "no data".
            let latest = sorted[sorted.len() - 1].price;
            tracing::debug!(
                profile = profile.as_str(),
                observations = sorted.len(),
                "No resolvable timeline points, falling back to a flat line"
            );
            return flat_line(profile, now, latest);
        }

        points
    }
}

/// A grid timestamp or real observation, before every point has a price.
#[derive(Debug, Clone)]
struct Candidate {
    timestamp: DateTime<Utc>,
    price: Option<Decimal>,
    is_fixed_grid_point: bool,
    is_actual_change: bool,
}

impl Candidate {
    fn grid(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            price: None,
            is_fixed_grid_point: true,
            is_actual_change: false,
        }
    }

    fn observed(observation: &PriceObservation) -> Self {
        Self {
            timestamp: observation.timestamp,
            price: Some(observation.price),
            is_fixed_grid_point: false,
            is_actual_change: true,
        }
    }

    fn into_point(self) -> Option<TimelinePoint> {
        Some(TimelinePoint {
            timestamp: self.timestamp,
            price: self.price?,
            is_fixed_grid_point: self.is_fixed_grid_point,
            is_actual_change: self.is_actual_change,
        })
    }
}

fn scale(duration: Duration, ratio: f64) -> Duration {
    Duration::milliseconds((duration.num_milliseconds() as f64 * ratio).round() as i64)
}

fn gap(a: DateTime<Utc>, b: DateTime<Utc>) -> Duration {
    let d = a - b;
    if d < Duration::zero() {
        -d
    } else {
        d
    }
}

fn sort_observations(observations: &[PriceObservation]) -> Vec<PriceObservation> {
    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.timestamp);
    sorted
}

fn within_window(sorted: &[PriceObservation], cutoff: DateTime<Utc>) -> Vec<PriceObservation> {
    sorted
        .iter()
        .filter(|o| o.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// Latest observation strictly before the window, else the earliest one.
fn forward_fill_seed(sorted: &[PriceObservation], cutoff: DateTime<Utc>) -> Option<&PriceObservation> {
    sorted
        .iter()
        .rev()
        .find(|o| o.timestamp < cutoff)
        .or_else(|| sorted.first())
}

/// `now - i * bucket` for `i` in `bucket_count - 1 ..= 0`.
fn grid_timestamps(profile: IntervalProfile, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let bucket = profile.bucket_duration();
    (0..profile.bucket_count())
        .rev()
        .map(|i| now - bucket * i as i32)
        .collect()
}

fn merge(grid: Vec<DateTime<Utc>>, relevant: &[PriceObservation]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = grid.into_iter().map(Candidate::grid).collect();
    candidates.extend(relevant.iter().map(Candidate::observed));
    // Stable: on an exact tie the grid point stays first and wins the dedupe.
    candidates.sort_by_key(|c| c.timestamp);
    candidates
}

fn dedupe(candidates: Vec<Candidate>, tolerance: Duration) -> Vec<Candidate> {
    let mut accepted: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let too_close = accepted
            .last()
            .map(|last| gap(candidate.timestamp, last.timestamp) <= tolerance)
            .unwrap_or(false);
        if !too_close {
            accepted.push(candidate);
        }
    }
    accepted
}

/// Latest observation at or before `at` in an ascending slice.
fn latest_at_or_before(sorted: &[PriceObservation], at: DateTime<Utc>) -> Option<&PriceObservation> {
    let idx = sorted.partition_point(|o| o.timestamp <= at);
    idx.checked_sub(1).map(|i| &sorted[i])
}

fn fill(
    candidates: Vec<Candidate>,
    relevant: &[PriceObservation],
    seed: Option<&PriceObservation>,
    sorted: &[PriceObservation],
) -> Vec<Candidate> {
    candidates
        .into_iter()
        .map(|mut c| {
            if c.price.is_none() {
                c.price = latest_at_or_before(relevant, c.timestamp)
                    .or(seed)
                    .or_else(|| latest_at_or_before(sorted, c.timestamp))
                    .or_else(|| sorted.first())
                    .map(|o| o.price);
            }
            c
        })
        .collect()
}

fn flag_near_changes(
    candidates: Vec<Candidate>,
    relevant: &[PriceObservation],
    tolerance: Duration,
) -> Vec<Candidate> {
    candidates
        .into_iter()
        .map(|mut c| {
            if c.is_fixed_grid_point && !c.is_actual_change {
                c.is_actual_change = relevant
                    .iter()
                    .any(|o| gap(o.timestamp, c.timestamp) <= tolerance);
            }
            c
        })
        .collect()
}

fn flat_line(profile: IntervalProfile, now: DateTime<Utc>, price: Decimal) -> Vec<TimelinePoint> {
    grid_timestamps(profile, now)
        .into_iter()
        .map(|timestamp| TimelinePoint {
            timestamp,
            price,
            is_fixed_grid_point: true,
            is_actual_change: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn obs(at: DateTime<Utc>, price: i64) -> PriceObservation {
        PriceObservation::new(at, Decimal::from(price))
    }

    fn assert_well_formed(points: &[TimelinePoint], profile: IntervalProfile) {
        let tolerance = scale(profile.bucket_duration(), 0.05);
        for pair in points.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
            assert!(pair[1].timestamp - pair[0].timestamp > tolerance);
        }
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        for profile in IntervalProfile::ALL {
            assert!(resample(&[], profile, now()).is_empty());
        }
    }

    #[test]
    fn test_grid_is_evenly_spaced_and_ends_at_now() {
        let grid = grid_timestamps(IntervalProfile::Hour6, now());
        assert_eq!(grid.len(), 24);
        assert_eq!(grid[23], now());
        assert_eq!(grid[0], now() - Duration::hours(6 * 23));
        for pair in grid.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::hours(6));
        }
    }

    #[test]
    fn test_single_old_observation_gives_flat_series() {
        let p = obs(now() - Duration::days(40), 1500);
        let points = resample(&[p], IntervalProfile::Day1, now());
        assert_eq!(points.len(), 30);
        assert!(points.iter().all(|pt| pt.price == Decimal::from(1500)));
        assert!(points.iter().all(|pt| pt.is_fixed_grid_point));
        assert!(points.iter().all(|pt| !pt.is_actual_change));
    }

    #[test]
    fn test_observation_on_grid_point_is_absorbed_by_grid() {
        let points = resample(&[obs(now(), 99)], IntervalProfile::Day1, now());
        assert_eq!(points.len(), 30);
        let last = points.last().unwrap();
        assert!(last.is_fixed_grid_point);
        assert!(last.is_actual_change);
        assert!(points.iter().all(|pt| pt.price == Decimal::from(99)));
    }

    #[test]
    fn test_single_mid_bucket_observation_adds_one_point() {
        let at = now() - Duration::hours(36);
        let points = resample(&[obs(at, 1500)], IntervalProfile::Day1, now());
        assert_eq!(points.len(), 31);
        assert_eq!(points.iter().filter(|p| p.is_fixed_grid_point).count(), 30);
        assert!(points.iter().all(|pt| pt.price == Decimal::from(1500)));
        let flagged: Vec<_> = points.iter().filter(|p| p.is_actual_change).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].timestamp, at);
        assert_well_formed(&points, IntervalProfile::Day1);
    }

    #[test]
    fn test_observation_between_grid_points_is_kept() {
        let at = now() - Duration::minutes(30);
        let points = resample(&[obs(at, 10)], IntervalProfile::Hour1, now());
        assert_eq!(points.len(), 25);
        let real: Vec<_> = points.iter().filter(|p| !p.is_fixed_grid_point).collect();
        assert_eq!(real.len(), 1);
        assert_eq!(real[0].timestamp, at);
        assert!(real[0].is_actual_change);
        assert_well_formed(&points, IntervalProfile::Hour1);
    }

    #[test]
    fn test_near_duplicate_observation_is_dropped() {
        // 2 minutes after a grid point is inside 5% of an hour (3 minutes).
        let at = now() - Duration::hours(3) + Duration::minutes(2);
        let points = resample(&[obs(at, 10)], IntervalProfile::Hour1, now());
        assert_eq!(points.len(), 24);
        assert!(points.iter().all(|p| p.is_fixed_grid_point));
    }

    #[test]
    fn test_forward_fill_then_backward_fill() {
        let t0 = now() - Duration::hours(20) - Duration::minutes(30);
        let t1 = now() - Duration::hours(5) - Duration::minutes(30);
        let points = resample(&[obs(t1, 12), obs(t0, 10)], IntervalProfile::Hour1, now());
        assert_well_formed(&points, IntervalProfile::Hour1);

        for p in &points {
            let expected = if p.timestamp >= t1 { 12 } else { 10 };
            assert_eq!(p.price, Decimal::from(expected), "at {}", p.timestamp);
        }
        // Grid points before t0 have nothing earlier: they take the first price.
        let first = &points[0];
        assert!(first.timestamp < t0);
        assert_eq!(first.price, Decimal::from(10));
    }

    #[test]
    fn test_pre_window_observation_forward_fills_into_window() {
        let before = obs(now() - Duration::hours(30), 200);
        let inside = obs(now() - Duration::hours(2) - Duration::minutes(30), 180);
        let points = resample(&[before, inside], IntervalProfile::Hour1, now());
        assert_eq!(points[0].price, Decimal::from(200));
        assert_eq!(points.last().unwrap().price, Decimal::from(180));
    }

    #[test]
    fn test_duplicate_timestamps_use_last_recorded() {
        let at = now() - Duration::hours(50);
        let points = resample(&[obs(at, 5), obs(at, 7)], IntervalProfile::Hour1, now());
        assert!(points.iter().all(|p| p.price == Decimal::from(7)));
    }

    #[test]
    fn test_near_change_flagging_only_close_grid_points() {
        let old = obs(now() - Duration::days(3), 100);
        // 6 minutes before the 5h grid point: within 15% (9 min), beyond 5% (3 min).
        let drop_at = now() - Duration::hours(5) - Duration::minutes(6);
        let points = resample(&[old, obs(drop_at, 80)], IntervalProfile::Hour1, now());

        let flagged: Vec<_> = points.iter().filter(|p| p.is_actual_change).collect();
        assert_eq!(flagged.len(), 2);
        assert!(flagged.iter().any(|p| !p.is_fixed_grid_point && p.timestamp == drop_at));
        assert!(flagged
            .iter()
            .any(|p| p.is_fixed_grid_point && p.timestamp == now() - Duration::hours(5)));

        let six_h = points
            .iter()
            .find(|p| p.timestamp == now() - Duration::hours(6))
            .unwrap();
        assert!(!six_h.is_actual_change);
        assert_eq!(six_h.price, Decimal::from(100));
    }

    #[test]
    fn test_resample_is_idempotent() {
        let data = vec![
            obs(now() - Duration::hours(100), 300),
            obs(now() - Duration::hours(40), 280),
            obs(now() - Duration::hours(41), 290),
            obs(now() - Duration::hours(3), 310),
        ];
        for profile in IntervalProfile::ALL {
            assert_eq!(resample(&data, profile, now()), resample(&data, profile, now()));
        }
    }

    #[test]
    fn test_unsorted_input_is_ordered_for_every_profile() {
        let data = vec![
            obs(now() - Duration::minutes(10), 1),
            obs(now() - Duration::days(80), 2),
            obs(now() - Duration::days(3), 3),
            obs(now() - Duration::hours(7), 4),
            obs(now() - Duration::days(20), 5),
        ];
        for profile in IntervalProfile::ALL {
            let points = resample(&data, profile, now());
            assert!(!points.is_empty());
            assert_well_formed(&points, profile);
        }
    }

    #[test]
    fn test_custom_config_widens_dedupe() {
        let at = now() - Duration::hours(3) + Duration::minutes(20);
        let strict = Resampler::with_config(ResampleConfig {
            dedupe_ratio: 0.5,
            near_change_ratio: 0.15,
        });
        let points = strict.resample(&[obs(at, 10)], IntervalProfile::Hour1, now());
        assert!(points.iter().all(|p| p.is_fixed_grid_point));
        assert_eq!(points.len(), 24);
    }

    #[test]
    fn test_flat_line_uses_every_grid_slot() {
        let points = flat_line(IntervalProfile::Week1, now(), Decimal::from(42));
        assert_eq!(points.len(), 12);
        assert!(points.iter().all(|p| p.price == Decimal::from(42) && !p.is_actual_change));
    }
}
