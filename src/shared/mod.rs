//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the database sends, so they can be used directly in wire types
//! without conversion overhead.

pub mod fmt;
pub mod serde_util;

use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── ProductId ───────────────────────────────────────────────────────────────

/// Newtype for product identifiers (the `products.id` column, a UUID string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for ProductId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProductId(s.to_string()))
    }
}

impl Serialize for ProductId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        id_from_value(deserializer, "product id").map(ProductId)
    }
}

/// Older tables use integer ids; accept both.
fn id_from_value<'de, D>(deserializer: D, what: &str) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "Invalid {}: {}",
            what, other
        ))),
    }
}

// ─── RowId ───────────────────────────────────────────────────────────────────

/// Primary key of the configuration tables (builds, limits, search configs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Serialize for RowId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        id_from_value(deserializer, "row id").map(RowId)
    }
}

// ─── Website ─────────────────────────────────────────────────────────────────

/// A scraped storefront.
///
/// Stored lowercase in the database (`"kabum"`, `"pichau"`, `"terabyte"`).
/// Unknown stores are preserved verbatim so new scrapers don't break listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Website {
    Kabum,
    Pichau,
    Terabyte,
    Other(String),
}

impl Website {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Kabum => "kabum",
            Self::Pichau => "pichau",
            Self::Terabyte => "terabyte",
            Self::Other(s) => s,
        }
    }

    /// Capitalized name shown on the dashboard (`"kabum"` → `"Kabum"`).
    pub fn display_name(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<&str> for Website {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "kabum" => Self::Kabum,
            "pichau" => Self::Pichau,
            "terabyte" => Self::Terabyte,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Website {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Website {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Website {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Website::from(s.as_str()))
    }
}

// ─── IntervalProfile ─────────────────────────────────────────────────────────

/// Chart interval preset: bucket spacing, bucket count and lookback window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntervalProfile {
    #[serde(rename = "1h")]
    Hour1,
    #[default]
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
}

impl IntervalProfile {
    pub const ALL: [IntervalProfile; 4] = [Self::Hour1, Self::Hour6, Self::Day1, Self::Week1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour1 => "1h",
            Self::Hour6 => "6h",
            Self::Day1 => "1d",
            Self::Week1 => "1w",
        }
    }

    /// Spacing between two grid points, in hours.
    pub fn bucket_hours(&self) -> i64 {
        match self {
            Self::Hour1 => 1,
            Self::Hour6 => 6,
            Self::Day1 => 24,
            Self::Week1 => 168,
        }
    }

    /// Number of fixed grid points on the chart.
    pub fn bucket_count(&self) -> usize {
        match self {
            Self::Hour1 => 24,
            Self::Hour6 => 24,
            Self::Day1 => 30,
            Self::Week1 => 12,
        }
    }

    /// How far back observations are considered, in hours.
    pub fn lookback_hours(&self) -> i64 {
        match self {
            Self::Hour1 => 24,
            Self::Hour6 => 144,
            Self::Day1 => 720,
            Self::Week1 => 2160,
        }
    }

    pub fn bucket_duration(&self) -> Duration {
        Duration::hours(self.bucket_hours())
    }

    pub fn lookback_window(&self) -> Duration {
        Duration::hours(self.lookback_hours())
    }

    /// Row cap for a price-history query over this profile's window.
    pub fn max_points(&self) -> usize {
        self.bucket_count() * 2
    }
}

impl std::fmt::Display for IntervalProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when an interval id isn't one of `1h`, `6h`, `1d`, `1w`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIntervalError(pub String);

impl std::fmt::Display for ParseIntervalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unknown interval '{}'. Supported: 1h, 6h, 1d, 1w",
            self.0
        )
    }
}

impl std::error::Error for ParseIntervalError {}

impl FromStr for IntervalProfile {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1h" => Ok(Self::Hour1),
            "6h" => Ok(Self::Hour6),
            "1d" => Ok(Self::Day1),
            "1w" => Ok(Self::Week1),
            _ => Err(ParseIntervalError(s.to_string())),
        }
    }
}
