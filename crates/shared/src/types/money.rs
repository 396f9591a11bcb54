//! Currency rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` with two decimal places (centavos).

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places stored for every monetary amount.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// Rounds an amount to currency precision using Banker's Rounding.
#[must_use]
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

/// Truncates an amount toward zero at currency precision.
///
/// Used for uniform installment amounts so the remainder is always
/// non-negative and can be absorbed by the last installment.
#[must_use]
pub fn truncate_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DECIMAL_PLACES, RoundingStrategy::ToZero)
}

/// Rounds a percentage to two decimals, half away from zero.
#[must_use]
pub fn round_percentage(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `part / whole * 100` rounded to two decimals.
///
/// A zero `whole` yields zero instead of a division error.
#[must_use]
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_percentage(part / whole * Decimal::ONE_HUNDRED)
}
