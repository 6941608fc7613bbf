//! # PC Scraper SDK
//!
//! Rust SDK for the PC Scraper price tracker: price timelines and chart
//! geometry, product listings and promotions, category price limits, scraper
//! health, saved builds and search configurations.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core**: types, timeline resampling, chart geometry, domain rules
//!    (always available, no I/O)
//! 2. **HTTP API**: `RestHttp` over PostgREST with per-verb retry policies
//! 3. **High-Level Client**: `PcScraperClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pc_scraper_sdk::prelude::*;
//!
//! let client = PcScraperClient::builder().from_env().build()?;
//!
//! let products = client.products().list(false).await?;
//! let chart = client
//!     .price_history()
//!     .chart(&products[0].id, IntervalProfile::Hour6)
//!     .await?;
//! if let Some(data) = chart.data() {
//!     println!("{}", data.geometry.line);
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Endpoint and environment constants.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// REST client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: High-Level Client ───────────────────────────────────────────────

/// `PcScraperClient`, the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{IntervalProfile, ProductId, RowId, Website};

    // Price history: resampling, geometry, charts
    pub use crate::domain::price_history::{
        resample, CanvasConfig, ChartData, Path, PathBuilder, PathCommand, PathGeometry, Point,
        PriceChart, PriceHistoryState, PriceObservation, PriceSummary, ResampleConfig, Resampler,
        TimelinePoint,
    };

    // Products and promotions
    pub use crate::domain::product::{
        HiddenReason, PriceStats, Product, ProductQuery, Promotion, PromotionReason,
        PromotionRules, PromotionVerdict, SortKey, SortOrder,
    };

    // Price limits
    pub use crate::domain::price_limit::{
        CategoryPriceLimit, Enforcement, PriceLimitError, PriceLimitUpsert,
    };

    // Dashboard
    pub use crate::domain::dashboard::{
        DashboardStats, DashboardSummary, ScraperStatus, WebsiteStats,
    };

    // Builds and search configurations
    pub use crate::domain::build::{Build, BuildQuote, BuildValidationError, NewBuild};
    pub use crate::domain::search_config::{
        KeywordGroup, NewSearchConfig, SearchConfig, SearchConfigError, SearchConfigFilter,
    };

    // Errors
    pub use crate::error::{HttpError, SdkError};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        BuildsClient, DashboardClient, PcScraperClient, PcScraperClientBuilder,
        PriceHistorySubClient, PriceLimitsClient, ProductsClient, SearchConfigsClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};
}
