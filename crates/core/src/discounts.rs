//! Discounts
//!
//! Percentage arithmetic shared by every discount in the engine. All
//! percentage-of-amount maths goes through [`percent_of_minor`] so the
//! loyalty-tier discount and the promotional-offer discount round
//! identically: half-up, to whole minor units.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Convert a whole-number percent (a tier's `5`, an offer's `15`) into a rate.
#[must_use]
pub fn rate_from_percent(percent: u8) -> Percentage {
    Percentage::from(f64::from(percent) / 100.0)
}

/// Calculate a percentage of an amount in minor units, rounded half-up.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows
/// or cannot be safely represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// The discount amount a rate yields against a base price.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the percentage calculation overflows.
pub fn discount_amount<'a>(
    base: &Money<'a, Currency>,
    percent: &Percentage,
) -> Result<Money<'a, Currency>, DiscountError> {
    let minor = percent_of_minor(percent, base.to_minor_units())?;

    Ok(Money::from_minor(minor, base.currency()))
}
