//! Payment collection
//!
//! A customer may settle with cash in any quoted currency, with gold, or with
//! both at once. Every leg is brought to HAS so the resolver compares like
//! with like.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, Money};
use domain_valuation::{
    convert_to_base, currency_to_has, valuate, Labor, PriceSide, PriceSnapshot,
};
use crate::error::SettlementError;

/// Gold handed over as payment, valued at its fine content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldLeg {
    pub weight_gram: Decimal,
    pub fineness: Decimal,
}

impl GoldLeg {
    pub fn new(weight_gram: Decimal, fineness: Decimal) -> Self {
        Self { weight_gram, fineness }
    }

    /// HAS content of the leg; no labor is credited on payment gold
    pub fn has(&self) -> Result<Decimal, SettlementError> {
        Ok(valuate(self.weight_gram, self.fineness, &Labor::none())?.total_has)
    }
}

/// What the paying side handed over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub cash: Money,
    #[serde(default)]
    pub gold: Vec<GoldLeg>,
}

impl Payment {
    /// Nothing paid
    pub fn none(currency: Currency) -> Self {
        Self { cash: Money::zero(currency), gold: Vec::new() }
    }

    pub fn cash(cash: Money) -> Self {
        Self { cash, gold: Vec::new() }
    }

    pub fn with_gold(mut self, weight_gram: Decimal, fineness: Decimal) -> Self {
        self.gold.push(GoldLeg::new(weight_gram, fineness));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cash.is_zero() && self.gold.is_empty()
    }
}

/// A payment expressed in HAS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedPayment {
    pub currency: Currency,
    /// Cash as paid, in `currency`
    pub cash_amount: Decimal,
    /// Cash in the snapshot's base currency
    pub cash_base: Decimal,
    /// Rate applied when `currency` is foreign
    pub exchange_rate: Option<Decimal>,
    pub cash_has: Decimal,
    pub gold_has: Decimal,
    pub total_has: Decimal,
}

/// Converts every leg of `payment` into HAS
///
/// `cash_side` picks the exchange rate for foreign cash, `has_side` the gold
/// price used to turn base currency into grams.
///
/// # Errors
///
/// Negative cash, a missing or invalid rate, or an invalid gold leg.
pub fn collect(
    payment: &Payment,
    snapshot: &PriceSnapshot,
    has_side: PriceSide,
    cash_side: PriceSide,
) -> Result<CollectedPayment, SettlementError> {
    if payment.cash.is_negative() {
        return Err(SettlementError::negative("payment.cash", payment.cash.amount()));
    }

    let (cash_base, exchange_rate, cash_has) = if payment.cash.is_zero() {
        (Decimal::ZERO, None, Decimal::ZERO)
    } else {
        let conversion = convert_to_base(payment.cash, snapshot, cash_side)?;
        let has = currency_to_has(conversion.base.amount(), snapshot, has_side)?;
        (conversion.base.amount(), conversion.rate, has)
    };

    let mut gold_has = Decimal::ZERO;
    for leg in &payment.gold {
        gold_has += leg.has()?;
    }

    let collected = CollectedPayment {
        currency: payment.cash.currency(),
        cash_amount: payment.cash.amount(),
        cash_base,
        exchange_rate,
        cash_has,
        gold_has,
        total_has: cash_has + gold_has,
    };

    debug!(
        currency = %collected.currency,
        cash_has = %collected.cash_has,
        gold_has = %collected.gold_has,
        "Payment collected"
    );

    Ok(collected)
}
