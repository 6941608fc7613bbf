//! Endpoint and environment constants.

/// PostgREST root under the project URL.
pub const REST_PATH: &str = "/rest/v1";

/// Environment variable holding the project URL.
pub const ENV_API_URL: &str = "PC_SCRAPER_API_URL";

/// Environment variable holding the anon/service key.
pub const ENV_API_KEY: &str = "PC_SCRAPER_API_KEY";

/// Websites whose scrapers are switched off; reported as disabled on the dashboard.
pub const DEFAULT_DISABLED_WEBSITES: &[&str] = &["pichau"];
