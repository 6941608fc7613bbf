//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: rich domain types and the pure logic over them
//! - `wire.rs`: table names, column lists and raw serde rows
//! - `convert.rs`: row → domain conversions, where rows need reshaping
//! - `state.rs`: app-owned containers fed by snapshots and realtime rows
//! - `client.rs`: sub-client with the REST calls (feature `http`)

pub mod build;
pub mod dashboard;
pub mod price_history;
pub mod price_limit;
pub mod product;
pub mod search_config;
