//! Chart geometry: maps a timeline onto a fixed SVG canvas.
//!
//! The canvas is the chart's `viewBox` drawing area: x from 10 to 390, y from
//! 20 (highest price) to 200 (baseline). Output is a pure function of the
//! input points and the [`CanvasConfig`].

use super::TimelinePoint;
use crate::shared::fmt::num::coord;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canvas bounds and shaping factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    /// Baseline; the filled area closes down to it.
    pub bottom: f64,
    /// Floor for the price range, as a fraction of the highest price.
    pub min_range_ratio: f64,
    /// Vertical headroom above and below, as a fraction of the price range.
    pub padding_ratio: f64,
    /// Damping applied to the neighbour vectors that place curve control points.
    pub smoothing: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            left: 10.0,
            right: 390.0,
            top: 20.0,
            bottom: 200.0,
            min_range_ratio: 0.02,
            padding_ratio: 0.1,
            smoothing: 0.3,
        }
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One SVG path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCommand::MoveTo(p) => write!(f, "M {} {}", coord(p.x), coord(p.y)),
            PathCommand::LineTo(p) => write!(f, "L {} {}", coord(p.x), coord(p.y)),
            PathCommand::CubicTo { c1, c2, to } => write!(
                f,
                "C {} {} {} {} {} {}",
                coord(c1.x),
                coord(c1.y),
                coord(c2.x),
                coord(c2.y),
                coord(to.x),
                coord(to.y)
            ),
            PathCommand::Close => write!(f, "Z"),
        }
    }
}

/// An ordered list of path commands; `Display` renders the SVG `d` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path(Vec<PathCommand>);

impl Path {
    pub fn commands(&self) -> &[PathCommand] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", cmd)?;
        }
        Ok(())
    }
}

/// Screen-space geometry for one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathGeometry {
    /// One canvas point per timeline point, for markers and hit-testing.
    pub points: Vec<Point>,
    /// The smoothed price line.
    pub line: Path,
    /// The line closed down to the baseline, for the gradient fill.
    pub area: Path,
}

/// Linear price → y mapping with padding and a minimum range.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriceScale {
    padded_min: f64,
    padded_range: f64,
    top: f64,
    bottom: f64,
}

impl PriceScale {
    fn new(prices: &[f64], config: &CanvasConfig) -> Self {
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let price_range = max - min;

        let floor = max * config.min_range_ratio;
        let mut actual_range = if price_range < floor { floor } else { price_range };
        if !(actual_range > 0.0) {
            // All prices zero (or negative): any positive range keeps the line centred.
            actual_range = 1.0;
        }

        let padding = actual_range * config.padding_ratio;
        let padded_min = min - padding;
        let padded_max = max + padding;
        let padded_range = if padded_max - padded_min > 0.0 {
            padded_max - padded_min
        } else {
            actual_range
        };

        Self {
            padded_min,
            padded_range,
            top: config.top,
            bottom: config.bottom,
        }
    }

    fn y(&self, price: f64) -> f64 {
        self.bottom - ((price - self.padded_min) / self.padded_range) * (self.bottom - self.top)
    }
}

/// Builds [`PathGeometry`] from timeline points.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    config: CanvasConfig,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn build(&self, timeline: &[TimelinePoint]) -> PathGeometry {
        if timeline.is_empty() {
            return PathGeometry::default();
        }

        let prices: Vec<f64> = timeline
            .iter()
            .map(|p| p.price.to_f64().unwrap_or(0.0))
            .collect();
        let scale = PriceScale::new(&prices, &self.config);

        let points: Vec<Point> = prices
            .iter()
            .enumerate()
            .map(|(i, price)| Point::new(self.x(i, prices.len()), scale.y(*price)))
            .collect();

        let first = points[0];
        let last = points[points.len() - 1];
        let segments = self.segments(timeline, &points);

        let mut line = vec![PathCommand::MoveTo(first)];
        if points.len() == 1 {
            line.push(PathCommand::LineTo(first));
        } else {
            line.extend(segments.iter().copied());
        }

        let baseline = self.config.bottom;
        let mut area = vec![
            PathCommand::MoveTo(Point::new(first.x, baseline)),
            PathCommand::LineTo(first),
        ];
        area.extend(segments);
        area.push(PathCommand::LineTo(Point::new(last.x, baseline)));
        area.push(PathCommand::Close);

        PathGeometry {
            points,
            line: Path(line),
            area: Path(area),
        }
    }

    fn x(&self, index: usize, len: usize) -> f64 {
        if len < 2 {
            return self.config.left;
        }
        let width = self.config.right - self.config.left;
        self.config.left + (index as f64 / (len - 1) as f64) * width
    }

    /// Commands from the first point onward (the initial move is not included).
    fn segments(&self, timeline: &[TimelinePoint], points: &[Point]) -> Vec<PathCommand> {
        let n = points.len();
        if n < 2 {
            return Vec::new();
        }
        if n == 2 {
            return vec![PathCommand::LineTo(points[1])];
        }

        let k = self.config.smoothing;
        (1..n)
            .map(|i| {
                let prev = points[i - 1];
                let cur = points[i];
                if timeline[i].price == timeline[i - 1].price {
                    return PathCommand::LineTo(cur);
                }

                let before = if i >= 2 { points[i - 2] } else { prev };
                let after = if i + 1 < n { points[i + 1] } else { cur };

                let lo = prev.y.min(cur.y);
                let hi = prev.y.max(cur.y);
                let c1 = Point::new(
                    prev.x + (cur.x - before.x) * k,
                    (prev.y + (cur.y - before.y) * k).clamp(lo, hi),
                );
                let c2 = Point::new(
                    cur.x - (after.x - prev.x) * k,
                    (cur.y - (after.y - prev.y) * k).clamp(lo, hi),
                );
                PathCommand::CubicTo { c1, c2, to: cur }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn timeline(prices: &[&str]) -> Vec<TimelinePoint> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| TimelinePoint {
                timestamp: start + Duration::hours(i as i64),
                price: Decimal::from_str(p).unwrap(),
                is_fixed_grid_point: true,
                is_actual_change: false,
            })
            .collect()
    }

    #[test]
    fn test_empty_timeline_has_no_paths() {
        let g = PathBuilder::new().build(&[]);
        assert!(g.points.is_empty());
        assert!(g.line.is_empty());
        assert!(g.area.is_empty());
    }

    #[test]
    fn test_single_point_is_zero_length_segment() {
        let g = PathBuilder::new().build(&timeline(&["100"]));
        assert_eq!(g.points.len(), 1);
        assert_eq!(g.points[0].x, 10.0);
        assert_eq!(g.line.to_svg(), "M 10 110 L 10 110");
        assert_eq!(g.area.to_svg(), "M 10 200 L 10 110 L 10 200 Z");
    }

    #[test]
    fn test_two_points_are_a_straight_segment() {
        let g = PathBuilder::new().build(&timeline(&["100", "200"]));
        assert_eq!(g.line.commands().len(), 2);
        assert!(matches!(g.line.commands()[1], PathCommand::LineTo(_)));
        assert_eq!(g.points[0].x, 10.0);
        assert_eq!(g.points[1].x, 390.0);
        // Range 100, padding 10: 100 → 200 - 10/120*180 = 185; 200 → 35.
        assert_eq!(g.line.to_svg(), "M 10 185 L 390 35");
    }

    #[test]
    fn test_all_equal_prices_use_range_floor() {
        let g = PathBuilder::new().build(&timeline(&["99.90"; 5]));
        for p in &g.points {
            assert!(p.y.is_finite());
            assert!((p.y - 110.0).abs() < 1e-9);
        }
        assert!(g
            .line
            .commands()
            .iter()
            .skip(1)
            .all(|c| matches!(c, PathCommand::LineTo(_))));
    }

    #[test]
    fn test_all_zero_prices_do_not_divide_by_zero() {
        let g = PathBuilder::new().build(&timeline(&["0", "0", "0"]));
        assert!(g.points.iter().all(|p| p.y.is_finite()));
    }

    #[test]
    fn test_x_spacing_is_index_based() {
        let g = PathBuilder::new().build(&timeline(&["1", "2", "3", "4", "5"]));
        let xs: Vec<f64> = g.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10.0, 105.0, 200.0, 295.0, 390.0]);
    }

    #[test]
    fn test_changes_are_cubic_and_flat_runs_are_straight() {
        let g = PathBuilder::new().build(&timeline(&["100", "100", "80", "80"]));
        let cmds = g.line.commands();
        assert!(matches!(cmds[1], PathCommand::LineTo(_)));
        assert!(matches!(cmds[2], PathCommand::CubicTo { .. }));
        assert!(matches!(cmds[3], PathCommand::LineTo(_)));
    }

    #[test]
    fn test_control_points_stay_within_segment() {
        let g = PathBuilder::new().build(&timeline(&["100", "50", "150", "60", "140"]));
        let pts = &g.points;
        for (i, cmd) in g.line.commands().iter().enumerate().skip(1) {
            if let PathCommand::CubicTo { c1, c2, to } = cmd {
                let from = pts[i - 1];
                let lo = from.y.min(to.y);
                let hi = from.y.max(to.y);
                assert!(c1.y >= lo && c1.y <= hi);
                assert!(c2.y >= lo && c2.y <= hi);
            }
        }
    }

    #[test]
    fn test_area_closes_to_baseline() {
        let g = PathBuilder::new().build(&timeline(&["10", "12", "11"]));
        let cmds = g.area.commands();
        assert_eq!(cmds[0], PathCommand::MoveTo(Point::new(10.0, 200.0)));
        assert_eq!(cmds[cmds.len() - 2], PathCommand::LineTo(Point::new(390.0, 200.0)));
        assert_eq!(cmds[cmds.len() - 1], PathCommand::Close);
        assert!(g.area.to_svg().ends_with("L 390 200 Z"));
    }

    #[test]
    fn test_geometry_is_deterministic() {
        let t = timeline(&["10", "14", "9", "9", "13"]);
        let b = PathBuilder::new();
        assert_eq!(b.build(&t), b.build(&t));
        assert_eq!(b.build(&t).line.to_svg(), b.build(&t).line.to_svg());
    }
}
