//! Scraper health dashboard.
//!
//! Each website's scraper is judged by how many price rows it touched in the
//! last 30 minutes against its average 30-minute volume over the last day.

#[cfg(feature = "http")]
pub mod client;
pub mod wire;

use crate::shared::Website;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 30-minute periods in 24 hours.
pub const PERIODS_PER_DAY: u64 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperStatus {
    Offline,
    /// More than 30% below average.
    Low,
    Normal,
    /// More than 50% above average.
    High,
    /// Scraper switched off; not counted in totals.
    Disabled,
}

impl ScraperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScraperStatus::Offline => "offline",
            ScraperStatus::Low => "low",
            ScraperStatus::Normal => "normal",
            ScraperStatus::High => "high",
            ScraperStatus::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for ScraperStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows per 30-minute period over the last 24 hours, rounded half up.
pub fn average_per_30m(historical_24h: u64) -> u64 {
    (historical_24h + PERIODS_PER_DAY / 2) / PERIODS_PER_DAY
}

pub fn classify(recent: u64, average: u64) -> ScraperStatus {
    if recent == 0 {
        ScraperStatus::Offline
    } else if recent * 10 < average * 7 {
        ScraperStatus::Low
    } else if recent * 2 > average * 3 {
        ScraperStatus::High
    } else {
        ScraperStatus::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteStats {
    pub website: Website,
    pub display_name: String,
    pub recent_count: u64,
    pub average_per_30m: u64,
    pub status: ScraperStatus,
}

impl WebsiteStats {
    pub fn new(website: Website, recent_count: u64, historical_24h: u64) -> Self {
        let average = average_per_30m(historical_24h);
        Self {
            display_name: website.display_name(),
            status: classify(recent_count, average),
            website,
            recent_count,
            average_per_30m: average,
        }
    }

    pub fn disabled(website: Website) -> Self {
        Self {
            display_name: website.display_name(),
            website,
            recent_count: 0,
            average_per_30m: 0,
            status: ScraperStatus::Disabled,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.status == ScraperStatus::Disabled
    }
}

/// Disabled sites last, then by display name.
pub fn dashboard_order(a: &WebsiteStats, b: &WebsiteStats) -> Ordering {
    a.is_disabled()
        .cmp(&b.is_disabled())
        .then_with(|| a.display_name.cmp(&b.display_name))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_active_websites: usize,
    pub total_recent_updates: u64,
    pub total_average_updates: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub generated_at: DateTime<Utc>,
    pub stats: Vec<WebsiteStats>,
    pub summary: DashboardSummary,
}

impl DashboardStats {
    /// Adds a disabled entry per `disabled` site, sorts, and totals the rest.
    pub fn assemble(
        mut stats: Vec<WebsiteStats>,
        disabled: &[Website],
        generated_at: DateTime<Utc>,
    ) -> Self {
        stats.retain(|s| !disabled.contains(&s.website));
        stats.extend(disabled.iter().cloned().map(WebsiteStats::disabled));
        stats.sort_by(dashboard_order);

        let active = stats.iter().filter(|s| !s.is_disabled());
        let summary = DashboardSummary {
            total_active_websites: active.clone().count(),
            total_recent_updates: active.clone().map(|s| s.recent_count).sum(),
            total_average_updates: active.map(|s| s.average_per_30m).sum(),
        };

        Self {
            generated_at,
            stats,
            summary,
        }
    }
}
