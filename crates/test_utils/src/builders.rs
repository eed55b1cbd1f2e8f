//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{DateTime, Utc};
use core_kernel::{Currency, ProductId, ProductTypeId};
use domain_stock::{Product, Unit};
use domain_valuation::PriceSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::SnapshotFixtures;

/// Builder for price snapshots
pub struct TestSnapshotBuilder {
    taken_at: DateTime<Utc>,
    base_currency: Currency,
    has_buy: Decimal,
    has_sell: Decimal,
    usd: Option<(Decimal, Decimal)>,
    eur: Option<(Decimal, Decimal)>,
}

impl Default for TestSnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSnapshotBuilder {
    /// Creates a builder matching `SnapshotFixtures::standard`
    pub fn new() -> Self {
        Self {
            taken_at: SnapshotFixtures::taken_at(),
            base_currency: Currency::TRY,
            has_buy: dec!(2900),
            has_sell: dec!(2950),
            usd: Some((dec!(42.50), dec!(42.80))),
            eur: Some((dec!(46.00), dec!(46.40))),
        }
    }

    /// Sets the snapshot time
    pub fn taken_at(mut self, at: DateTime<Utc>) -> Self {
        self.taken_at = at;
        self
    }

    /// Sets the gold prices
    pub fn with_gold(mut self, buy: Decimal, sell: Decimal) -> Self {
        self.has_buy = buy;
        self.has_sell = sell;
        self
    }

    /// Sets the USD rates
    pub fn with_usd(mut self, buy: Decimal, sell: Decimal) -> Self {
        self.usd = Some((buy, sell));
        self
    }

    /// Drops the USD quote
    pub fn without_usd(mut self) -> Self {
        self.usd = None;
        self
    }

    /// Drops the EUR quote
    pub fn without_eur(mut self) -> Self {
        self.eur = None;
        self
    }

    /// Sets the base currency
    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.base_currency = currency;
        self
    }

    pub fn build(self) -> PriceSnapshot {
        let mut snapshot = PriceSnapshot::new(self.taken_at, self.has_buy, self.has_sell)
            .in_currency(self.base_currency);
        if let Some((buy, sell)) = self.usd {
            snapshot = snapshot.with_usd(buy, sell);
        }
        if let Some((buy, sell)) = self.eur {
            snapshot = snapshot.with_eur(buy, sell);
        }
        snapshot
    }
}

/// Builder for FIFO lots
pub struct TestLotBuilder {
    id: Option<ProductId>,
    product_type_id: ProductTypeId,
    unit: Unit,
    quantity: Decimal,
    remaining: Option<Decimal>,
    fineness: Decimal,
    sale_has_value: Decimal,
}

impl Default for TestLotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLotBuilder {
    /// Creates a builder for 10 pieces at 0.916 worth 50 HAS
    pub fn new() -> Self {
        Self {
            id: None,
            product_type_id: ProductTypeId::new(),
            unit: Unit::Piece,
            quantity: dec!(10),
            remaining: None,
            fineness: dec!(0.916),
            sale_has_value: dec!(50),
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    /// Counts the lot in grams instead of pieces
    pub fn in_grams(mut self) -> Self {
        self.unit = Unit::Gram;
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets units still sellable, as if part of the lot was already sold
    pub fn with_remaining(mut self, remaining: Decimal) -> Self {
        self.remaining = Some(remaining);
        self
    }

    pub fn with_fineness(mut self, fineness: Decimal) -> Self {
        self.fineness = fineness;
        self
    }

    pub fn with_value(mut self, sale_has_value: Decimal) -> Self {
        self.sale_has_value = sale_has_value;
        self
    }

    /// Builds the lot
    ///
    /// # Panics
    ///
    /// Panics if the values do not make a valid lot.
    pub fn build(self) -> Product {
        let mut lot = Product::fifo(
            self.product_type_id,
            self.unit,
            self.quantity,
            self.fineness,
            self.sale_has_value,
        )
        .expect("test lot should be valid");
        if let Some(id) = self.id {
            lot = lot.with_id(id);
        }
        if let Some(remaining) = self.remaining {
            lot = lot.with_remaining(remaining);
        }
        lot
    }
}
