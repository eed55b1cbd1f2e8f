//! Cash amounts
//!
//! Gold is counted in HAS grams by the valuation crates; this module only
//! covers the cash side of a transaction. Amounts are exact decimals and are
//! rounded to kuruş or cents only when printed on a receipt.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currencies accepted at the counter
///
/// TRY is the usual base currency. USD and EUR are quoted on every price
/// snapshot and can be paid in or exchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    TRY,
    USD,
    EUR,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::TRY, Currency::USD, Currency::EUR];

    /// Places printed on a receipt (kuruş, cents)
    pub const fn receipt_places(self) -> u32 {
        2
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::TRY => "₺",
            Currency::USD => "$",
            Currency::EUR => "€",
        }
    }

    /// ISO 4217 code
    pub const fn code(self) -> &'static str {
        match self {
            Currency::TRY => "TRY",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    /// Accepts ISO codes in any case, plus the colloquial "TL"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code == "TL" {
            return Ok(Currency::TRY);
        }
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(MoneyError::UnknownCurrency(code))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Cannot combine {left} with {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// An amount of cash in one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Fails unless the amount is in `currency`
    pub fn require_currency(&self, currency: Currency) -> Result<(), MoneyError> {
        if self.currency != currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: currency,
            });
        }
        Ok(())
    }

    /// Sums two amounts of the same currency
    pub fn try_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.require_currency(other.currency)?;
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// The amount as printed on a receipt, half away from zero
    pub fn for_receipt(&self) -> Money {
        let amount = self
            .amount
            .round_dp_with_strategy(self.currency.receipt_places(), RoundingStrategy::MidpointAwayFromZero);
        Self::new(amount, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency.receipt_places() as usize;
        write!(f, "{:.places$} {}", self.amount, self.currency.symbol())
    }
}
