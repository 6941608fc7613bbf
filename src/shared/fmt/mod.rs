//! Display formatting for prices and chart coordinates.

pub mod decimal;
pub mod num;
