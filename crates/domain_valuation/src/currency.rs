//! Currency conversion
//!
//! Rates are always "base-currency units per one foreign unit", as quoted on
//! the price snapshot. Nothing here rounds; callers round for display.

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use crate::error::ValuationError;
use crate::price::{PriceSide, PriceSnapshot};

fn check_rate(rate: Decimal) -> Result<Decimal, ValuationError> {
    if rate <= Decimal::ZERO {
        return Err(ValuationError::InvalidRate(rate));
    }
    Ok(rate)
}

/// Converts a foreign amount into the base currency
///
/// # Example
///
/// ```rust
/// use domain_valuation::currency::to_base;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(to_base(dec!(100), dec!(42.50)).unwrap(), dec!(4250));
/// ```
pub fn to_base(foreign_amount: Decimal, rate: Decimal) -> Result<Decimal, ValuationError> {
    Ok(foreign_amount * check_rate(rate)?)
}

/// Converts a base-currency amount into a foreign currency
pub fn to_foreign(base_amount: Decimal, rate: Decimal) -> Result<Decimal, ValuationError> {
    Ok(base_amount / check_rate(rate)?)
}

/// A cash amount converted into the base currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseConversion {
    /// The amount in the base currency
    pub base: Money,
    /// Rate applied; `None` when the amount was already in the base currency
    pub rate: Option<Decimal>,
}

/// Converts `money` into the snapshot's base currency using the given side
///
/// # Errors
///
/// `MissingRate` (configuration) when the snapshot does not quote the
/// currency, `InvalidRate` when the quoted rate is not positive.
pub fn convert_to_base(
    money: Money,
    snapshot: &PriceSnapshot,
    side: PriceSide,
) -> Result<BaseConversion, ValuationError> {
    if money.currency() == snapshot.base_currency {
        return Ok(BaseConversion { base: money, rate: None });
    }

    let rate = snapshot.require_rate(money.currency(), side)?;
    let base_amount = to_base(money.amount(), rate)?;

    Ok(BaseConversion {
        base: Money::new(base_amount, snapshot.base_currency),
        rate: Some(rate),
    })
}

/// Converts a base-currency amount into `target` using the given side
pub fn convert_from_base(
    base_amount: Decimal,
    target: Currency,
    snapshot: &PriceSnapshot,
    side: PriceSide,
) -> Result<Money, ValuationError> {
    if target == snapshot.base_currency {
        return Ok(Money::new(base_amount, target));
    }
    let rate = snapshot.require_rate(target, side)?;
    Ok(Money::new(to_foreign(base_amount, rate)?, target))
}
