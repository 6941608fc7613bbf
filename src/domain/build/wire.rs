//! Wire constants for the `builds` table.
//!
//! `Build` deserializes straight from table rows and `NewBuild` serializes as
//! the insert body, so no separate row types are needed.

pub const BUILDS_TABLE: &str = "builds";
