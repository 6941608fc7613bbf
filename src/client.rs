//! High-level client: `PcScraperClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, shared configuration, and accessor methods.

use crate::domain::build::client::Builds;
use crate::domain::dashboard::client::Dashboard;
use crate::domain::price_history::client::PriceHistoryClient;
use crate::domain::price_limit::client::PriceLimits;
use crate::domain::product::client::Products;
use crate::domain::search_config::client::SearchConfigs;
use crate::error::SdkError;
use crate::http::{RestHttp, RetryPolicy};
use crate::network::{DEFAULT_DISABLED_WEBSITES, ENV_API_KEY, ENV_API_URL, REST_PATH};
use crate::shared::Website;

// Re-export sub-client types for convenience.
pub use crate::domain::build::client::Builds as BuildsClient;
pub use crate::domain::dashboard::client::Dashboard as DashboardClient;
pub use crate::domain::price_history::client::PriceHistoryClient as PriceHistorySubClient;
pub use crate::domain::price_limit::client::PriceLimits as PriceLimitsClient;
pub use crate::domain::product::client::Products as ProductsClient;
pub use crate::domain::search_config::client::SearchConfigs as SearchConfigsClient;

/// The primary entry point for the PC Scraper SDK.
///
/// Provides nested sub-client accessors for each domain:
/// `client.products()`, `client.price_history()`, etc.
#[derive(Clone)]
pub struct PcScraperClient {
    pub(crate) http: RestHttp,
    /// Storefronts whose scrapers are switched off.
    pub(crate) disabled_websites: Vec<Website>,
}

impl PcScraperClient {
    pub fn builder() -> PcScraperClientBuilder {
        PcScraperClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn products(&self) -> Products<'_> {
        Products { client: self }
    }

    pub fn price_history(&self) -> PriceHistoryClient<'_> {
        PriceHistoryClient { client: self }
    }

    pub fn price_limits(&self) -> PriceLimits<'_> {
        PriceLimits { client: self }
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard { client: self }
    }

    pub fn builds(&self) -> Builds<'_> {
        Builds { client: self }
    }

    pub fn search_configs(&self) -> SearchConfigs<'_> {
        SearchConfigs { client: self }
    }

    pub fn disabled_websites(&self) -> &[Website] {
        &self.disabled_websites
    }

    /// Use a user session token as bearer instead of the API key.
    /// Shared by every clone of this client.
    pub async fn set_auth_token(&self, token: impl Into<String>) {
        self.http.set_auth_token(Some(token.into())).await;
    }

    pub async fn clear_auth_token(&self) {
        self.http.set_auth_token(None).await;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.http.has_auth_token().await
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct PcScraperClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    auth_token: Option<String>,
    disabled_websites: Vec<Website>,
    read_retry: RetryPolicy,
}

impl Default for PcScraperClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            auth_token: None,
            disabled_websites: DEFAULT_DISABLED_WEBSITES
                .iter()
                .map(|w| Website::from(*w))
                .collect(),
            read_retry: RetryPolicy::Idempotent,
        }
    }
}

impl PcScraperClientBuilder {
    /// Project URL, e.g. `https://xyz.supabase.co`. `/rest/v1` is appended.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Pre-set a session token on construction.
    pub fn auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    pub fn disabled_websites<I, W>(mut self, websites: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Website>,
    {
        self.disabled_websites = websites.into_iter().map(Into::into).collect();
        self
    }

    /// Retry policy for reads. Writes never retry.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    /// Fill URL and key from `PC_SCRAPER_API_URL` / `PC_SCRAPER_API_KEY`.
    /// Values already set on the builder win.
    pub fn from_env(mut self) -> Self {
        if self.base_url.is_none() {
            self.base_url = std::env::var(ENV_API_URL).ok().filter(|v| !v.trim().is_empty());
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var(ENV_API_KEY).ok().filter(|v| !v.trim().is_empty());
        }
        self
    }

    pub fn build(self) -> Result<PcScraperClient, SdkError> {
        let base_url = self.base_url.ok_or_else(|| {
            SdkError::Config(format!("No API URL configured (set {} or call base_url)", ENV_API_URL))
        })?;
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SdkError::Config(format!("Invalid API URL: {}", base_url)));
        }
        let rest_url = format!("{}{}", base_url, REST_PATH);
        if self.api_key.is_none() {
            tracing::warn!("no API key configured; requests will be anonymous");
        }

        let http = RestHttp::new(&rest_url, self.api_key)?
            .with_read_retry(self.read_retry)
            .with_auth_token(self.auth_token);
        tracing::debug!(rest_url = %rest_url, "client built");

        Ok(PcScraperClient {
            http,
            disabled_websites: self.disabled_websites,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_url() {
        let err = PcScraperClient::builder().build().err().unwrap();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn test_build_rejects_non_http_url() {
        let err = PcScraperClient::builder()
            .base_url("db.example.com")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn test_rest_url_appends_path() {
        let client = PcScraperClient::builder()
            .base_url("https://db.example.com/")
            .api_key("anon")
            .build()
            .unwrap();
        assert_eq!(client.http.rest_url(), "https://db.example.com/rest/v1");
    }

    #[test]
    fn test_default_disabled_websites() {
        let client = PcScraperClient::builder()
            .base_url("https://db.example.com")
            .build()
            .unwrap();
        assert_eq!(client.disabled_websites(), &[Website::Pichau]);

        let client = PcScraperClient::builder()
            .base_url("https://db.example.com")
            .disabled_websites(Vec::<Website>::new())
            .build()
            .unwrap();
        assert!(client.disabled_websites().is_empty());
    }

    #[test]
    fn test_no_token_by_default() {
        let client = PcScraperClient::builder()
            .base_url("https://db.example.com")
            .api_key("anon")
            .build()
            .unwrap();
        assert!(!tokio_test::block_on(client.is_authenticated()));
        tokio_test::block_on(client.clear_auth_token());
        assert!(!tokio_test::block_on(client.is_authenticated()));
    }

    #[tokio::test]
    async fn test_auth_token_round_trip() {
        let client = PcScraperClient::builder()
            .base_url("https://db.example.com")
            .auth_token("session")
            .build()
            .unwrap();
        assert!(client.is_authenticated().await);
        let clone = client.clone();
        clone.clear_auth_token().await;
        assert!(!client.is_authenticated().await);
        client.set_auth_token("again").await;
        assert!(clone.is_authenticated().await);
    }
}
