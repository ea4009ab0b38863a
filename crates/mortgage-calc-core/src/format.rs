//! Two-decimal display formatting for the payment breakdown.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to cents, midpoint away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed two-decimal text without a currency symbol, e.g. `"20.00"`.
pub fn format_fixed2(value: Decimal) -> String {
    let mut rounded = round_cents(value);
    rounded.rescale(2);
    rounded.to_string()
}

/// Render an amount with a leading `$` and exactly two decimals: `"$1838.92"`.
pub fn format_currency(value: Decimal) -> String {
    format!("${}", format_fixed2(value))
}
