//! Pricing
//!
//! Minor-unit arithmetic shared by the basket, offers and delivery rules. Every amount the
//! engine produces is an integer number of minor units, so rounding to the currency's
//! precision never has to happen after the fact.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors that can occur while pricing basket lines.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Multiplying a price by a quantity overflowed an `i64` of minor units.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates `price × quantity` for a basket line.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: the line total does not fit in minor units.
/// - [`PricingError::Money`]: the unit price is not a whole number of minor units.
pub fn line_price<'a>(
    price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = price
        .try_to_minor_units()?
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, price.currency()))
}

/// Halves a price, rounding down to the nearest minor unit.
///
/// `32.95` halves to `16.47`, never `16.48`.
pub fn half_price_floor<'a>(price: &Money<'a, Currency>) -> Money<'a, Currency> {
    Money::from_minor(price.to_minor_units().div_euclid(2), price.currency())
}

/// Sums a sequence of amounts, starting from zero in the given currency.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if an amount is in a different currency or the sum
/// overflows.
pub fn sum<'a, I>(currency: &'a Currency, amounts: I) -> Result<Money<'a, Currency>, PricingError>
where
    I: IntoIterator<Item = Money<'a, Currency>>,
{
    let total = amounts
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| acc.add(amount))?;

    Ok(total)
}
