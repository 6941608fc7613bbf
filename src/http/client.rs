//! Low-level REST client: `RestHttp`.
//!
//! Generic table verbs over PostgREST (`select`, `insert`, `upsert`,
//! `update`, `delete`). Returns wire types; conversion to domain types
//! happens in the sub-clients.

use crate::error::HttpError;
use crate::http::query::Query;
use crate::http::retry::RetryPolicy;

use async_lock::RwLock;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// Low-level client for the PostgREST endpoint.
pub struct RestHttp {
    rest_url: String,
    api_key: Option<String>,
    client: Client,
    /// Session token; overrides the API key as bearer when set.
    auth_token: Arc<RwLock<Option<String>>>,
    read_retry: RetryPolicy,
}

impl RestHttp {
    /// `rest_url` is the full REST root, e.g. `https://host/rest/v1`.
    pub fn new(rest_url: &str, api_key: Option<String>) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder
                .timeout(Duration::from_secs(30))
                .pool_max_idle_per_host(10);
        }

        Ok(Self {
            rest_url: rest_url.trim_end_matches('/').to_string(),
            api_key,
            client: builder.build()?,
            auth_token: Arc::new(RwLock::new(None)),
            read_retry: RetryPolicy::Idempotent,
        })
    }

    pub(crate) fn with_read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    /// Construction-time token; later changes go through `set_auth_token`.
    pub(crate) fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = Arc::new(RwLock::new(token));
        self
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    pub(crate) async fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.write().await = token;
    }

    pub(crate) async fn has_auth_token(&self) -> bool {
        self.auth_token.read().await.is_some()
    }

    // ── Table verbs ──────────────────────────────────────────────────────

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, HttpError> {
        let url = self.table_url(table, query);
        self.request_with_retry(Method::GET, &url, None::<&()>, None, self.read_retry.clone())
            .await
    }

    pub async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        rows: &B,
    ) -> Result<Vec<T>, HttpError> {
        let url = self.table_url(table, &Query::new());
        self.request_with_retry(
            Method::POST,
            &url,
            Some(rows),
            Some(RETURN_REPRESENTATION),
            RetryPolicy::None,
        )
        .await
    }

    /// Insert or merge on the `on_conflict` column(s).
    pub async fn upsert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        rows: &B,
        on_conflict: &str,
    ) -> Result<Vec<T>, HttpError> {
        let url = format!(
            "{}/{}?on_conflict={}",
            self.rest_url,
            table,
            urlencoding::encode(on_conflict)
        );
        self.request_with_retry(
            Method::POST,
            &url,
            Some(rows),
            Some(MERGE_DUPLICATES),
            RetryPolicy::None,
        )
        .await
    }

    /// Patch matching rows and return them. Refuses an unfiltered query.
    pub async fn update<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &Query,
        patch: &B,
    ) -> Result<Vec<T>, HttpError> {
        Self::require_filters(table, query)?;
        let url = self.table_url(table, query);
        self.request_with_retry(
            Method::PATCH,
            &url,
            Some(patch),
            Some(RETURN_REPRESENTATION),
            RetryPolicy::None,
        )
        .await
    }

    /// Delete matching rows and return them. Refuses an unfiltered query.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, HttpError> {
        Self::require_filters(table, query)?;
        let url = self.table_url(table, query);
        self.request_with_retry(
            Method::DELETE,
            &url,
            None::<&()>,
            Some(RETURN_REPRESENTATION),
            RetryPolicy::None,
        )
        .await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    fn table_url(&self, table: &str, query: &Query) -> String {
        let qs = query.to_query_string();
        if qs.is_empty() {
            format!("{}/{}", self.rest_url, table)
        } else {
            format!("{}/{}?{}", self.rest_url, table, qs)
        }
    }

    fn require_filters(table: &str, query: &Query) -> Result<(), HttpError> {
        if query.has_filters() {
            Ok(())
        } else {
            Err(HttpError::BadRequest(format!(
                "refusing to modify every row of '{}'",
                table
            )))
        }
    }

    async fn request_with_retry<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        prefer: Option<&str>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let Some(config) = retry.config() else {
            return self.do_request(&method, url, body, prefer).await;
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T, B>(&method, url, body, prefer).await {
                Ok(resp) => return Ok(resp),
                Err(e) if !config.should_retry(&e) => return Err(e),
                Err(e) if attempt == config.max_retries => last_error = Some(e),
                Err(e) => {
                    let delay = config.delay_after(&e, attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        max = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying {} {}",
                        method,
                        url
                    );
                    futures_timer::Delay::new(delay).await;
                    last_error = Some(e);
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
        prefer: Option<&str>,
    ) -> Result<T, HttpError> {
        let mut req = self.client.request(method.clone(), url);

        if let Some(key) = &self.api_key {
            req = req.header("apikey", key);
        }
        let token = self.auth_token.read().await.clone();
        if let Some(bearer) = token.as_ref().or(self.api_key.as_ref()) {
            req = req.header("Authorization", format!("Bearer {}", bearer));
        }
        if let Some(p) = prefer {
            req = req.header("Prefer", p);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let status_code = status.as_u16();
        let retry_after_ms = retry_after_ms(resp.headers());
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            401 => Err(HttpError::Unauthorized),
            403 => Err(HttpError::Forbidden(body_text)),
            404 => Err(HttpError::NotFound(body_text)),
            408 => Err(HttpError::Timeout),
            429 => Err(HttpError::RateLimited { retry_after_ms }),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

/// `Retry-After` in whole seconds, as milliseconds.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

impl Clone for RestHttp {
    fn clone(&self) -> Self {
        Self {
            rest_url: self.rest_url.clone(),
            api_key: self.api_key.clone(),
            client: self.client.clone(),
            auth_token: self.auth_token.clone(),
            read_retry: self.read_retry.clone(),
        }
    }
}
