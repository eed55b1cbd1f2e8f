//! Price snapshots
//!
//! A snapshot carries the fine-gold buy/sell price in the base currency and
//! the buy/sell rates of the foreign currencies. Snapshots are immutable; a
//! newer one replaces an older one wholesale.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Currency, SnapshotId};
use crate::error::ValuationError;

/// Which side of a quote applies
///
/// The shop buys at the buy price and sells at the sell price. For gold the
/// side follows the direction gold moves; for foreign cash it follows the
/// direction the cash moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSide {
    /// Shop is acquiring
    Buy,
    /// Shop is disposing
    Sell,
}

impl fmt::Display for PriceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSide::Buy => write!(f, "buy"),
            PriceSide::Sell => write!(f, "sell"),
        }
    }
}

/// A buy/sell quote pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub buy: Decimal,
    pub sell: Decimal,
}

impl Quote {
    pub fn new(buy: Decimal, sell: Decimal) -> Self {
        Self { buy, sell }
    }

    pub fn side(&self, side: PriceSide) -> Decimal {
        match side {
            PriceSide::Buy => self.buy,
            PriceSide::Sell => self.sell,
        }
    }

    fn validate(&self, name: &str) -> Result<(), ValuationError> {
        if self.buy <= Decimal::ZERO || self.sell <= Decimal::ZERO {
            return Err(ValuationError::InvalidSnapshot(format!(
                "{} prices must be positive (buy={}, sell={})",
                name, self.buy, self.sell
            )));
        }
        if self.buy > self.sell {
            return Err(ValuationError::InvalidSnapshot(format!(
                "{} buy price {} exceeds sell price {}",
                name, self.buy, self.sell
            )));
        }
        Ok(())
    }
}

/// Latest gold and currency prices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Unique identifier
    pub id: SnapshotId,
    /// When the prices were fetched
    pub timestamp: DateTime<Utc>,
    /// Currency the gold price is quoted in
    pub base_currency: Currency,
    /// Base-currency price per HAS gram
    pub has: Quote,
    /// Base-currency price of one US dollar
    pub usd: Option<Quote>,
    /// Base-currency price of one euro
    pub eur: Option<Quote>,
}

impl PriceSnapshot {
    /// Creates a snapshot with gold prices only
    pub fn new(timestamp: DateTime<Utc>, has_buy: Decimal, has_sell: Decimal) -> Self {
        Self {
            id: SnapshotId::new_v7(),
            timestamp,
            base_currency: Currency::TRY,
            has: Quote::new(has_buy, has_sell),
            usd: None,
            eur: None,
        }
    }

    /// Sets the base currency
    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.base_currency = currency;
        self
    }

    /// Sets the US dollar quote
    pub fn with_usd(mut self, buy: Decimal, sell: Decimal) -> Self {
        self.usd = Some(Quote::new(buy, sell));
        self
    }

    /// Sets the euro quote
    pub fn with_eur(mut self, buy: Decimal, sell: Decimal) -> Self {
        self.eur = Some(Quote::new(buy, sell));
        self
    }

    pub fn has_buy(&self) -> Decimal {
        self.has.buy
    }

    pub fn has_sell(&self) -> Decimal {
        self.has.sell
    }

    /// Checks that every quote present is positive and not inverted
    pub fn validate(&self) -> Result<(), ValuationError> {
        self.has.validate("HAS")?;
        if let Some(usd) = &self.usd {
            usd.validate("USD")?;
        }
        if let Some(eur) = &self.eur {
            eur.validate("EUR")?;
        }
        Ok(())
    }

    /// Rejects a snapshot older than `max_age` relative to `now`
    pub fn ensure_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> Result<(), ValuationError> {
        if now - self.timestamp > max_age {
            return Err(ValuationError::StaleSnapshot {
                taken_at: self.timestamp,
                max_age_secs: max_age.num_seconds(),
            });
        }
        Ok(())
    }

    /// Gold price per HAS gram on the given side
    pub fn has_price(&self, side: PriceSide) -> Decimal {
        self.has.side(side)
    }

    /// Base-currency units per one unit of `currency`
    ///
    /// The base currency always converts at 1. `None` means the snapshot
    /// does not quote that currency.
    pub fn rate(&self, currency: Currency, side: PriceSide) -> Option<Decimal> {
        if currency == self.base_currency {
            return Some(Decimal::ONE);
        }
        let quote = match currency {
            Currency::USD => self.usd,
            Currency::EUR => self.eur,
            Currency::TRY => None,
        };
        quote.map(|q| q.side(side))
    }

    /// Like [`rate`](Self::rate), failing when the rate is missing
    pub fn require_rate(&self, currency: Currency, side: PriceSide) -> Result<Decimal, ValuationError> {
        self.rate(currency, side)
            .ok_or(ValuationError::MissingRate { currency, side })
    }
}
