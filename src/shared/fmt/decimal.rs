//! Decimal formatting utilities for human-readable display.
//!
//! Prices are shown in Brazilian reais: `R$ 1.234,56` (dot for thousands,
//! comma for decimals, always two decimal places).

use super::num::group_thousands;
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

fn round_half_up(value: &Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an absolute amount as `1.234,56` with the given number of decimals.
fn pt_br_number(value: &Decimal, decimals: u32) -> String {
    let rounded = round_half_up(&value.abs(), decimals);
    let formatted = format!("{:.precision$}", rounded, precision = decimals as usize);
    let mut parts = formatted.splitn(2, '.');
    let integer = parts.next().unwrap_or("0");
    let integer = group_thousands(integer, '.');
    match parts.next() {
        Some(frac) => format!("{},{}", integer, frac),
        None => integer,
    }
}

/// Format a price as `R$ 1.234,56`.
pub fn brl(value: &Decimal) -> String {
    let sign = if value.is_sign_negative() && !round_half_up(value, 2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}R$ {}", sign, pt_br_number(value, 2))
}

/// Format a percentage change with one decimal and an explicit sign: `-12,5%`.
pub fn signed_pct(value: &Decimal) -> String {
    let rounded = round_half_up(value, 1);
    let sign = if rounded > Decimal::ZERO {
        "+"
    } else if rounded < Decimal::ZERO {
        "-"
    } else {
        ""
    };
    format!("{}{}%", sign, pt_br_number(&rounded, 1))
}
