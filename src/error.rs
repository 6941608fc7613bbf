//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl From<crate::domain::build::BuildValidationError> for SdkError {
    fn from(err: crate::domain::build::BuildValidationError) -> Self {
        SdkError::Validation(err.to_string())
    }
}

impl From<crate::domain::search_config::SearchConfigError> for SdkError {
    fn from(err: crate::domain::search_config::SearchConfigError) -> Self {
        SdkError::Validation(err.to_string())
    }
}

impl From<crate::domain::price_limit::PriceLimitError> for SdkError {
    fn from(err: crate::domain::price_limit::PriceLimitError) -> Self {
        SdkError::Validation(err.to_string())
    }
}

impl From<crate::shared::ParseIntervalError> for SdkError {
    fn from(err: crate::shared::ParseIntervalError) -> Self {
        SdkError::Validation(err.to_string())
    }
}
