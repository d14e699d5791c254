//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done on `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use rust_decimal::prelude::*;

/// Rounding: 2 decimal places, half-up (currency policy)
const DECIMAL_PLACES: u32 = 2;

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `quantity * unit_price`, exact
pub fn line_total(unit_price: f64, quantity: i64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Apply a fractional tax rate to a subtotal and round the grand total.
///
/// Returns `(tax, total)`; the total is rounded from the unrounded sum so
/// it never drifts from `subtotal * (1 + rate)`.
pub fn apply_tax(subtotal: Decimal, tax_rate: f64) -> (Decimal, Decimal) {
    let rate = to_decimal(tax_rate);
    let tax = subtotal * rate;
    let total = round_money(subtotal + tax);
    (round_money(tax), total)
}
