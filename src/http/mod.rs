//! REST layer: `RestHttp` over PostgREST with per-verb retry policies.

pub mod client;
pub mod query;
pub mod retry;

pub use client::RestHttp;
pub use query::Query;
pub use retry::{RetryConfig, RetryPolicy};
