//! Pre-built Test Fixtures
//!
//! Provides ready-to-use reference data for the valuation engine. Values are
//! fixed so expected results can be worked out by hand.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Currency, KaratId, Money, PartyId, ProductTypeId};
use domain_stock::{PoolKey, Product, StockPoolBucket, Unit};
use domain_valuation::{Karat, KaratTable, PriceSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for karat reference data
pub struct KaratFixtures;

impl KaratFixtures {
    /// The standard karat table
    pub fn table() -> KaratTable {
        KaratTable::standard()
    }

    /// All standard karats, as a karat port would return them
    pub fn all() -> Vec<Karat> {
        Self::table().iter().cloned().collect()
    }

    /// Looks up a standard karat by label
    pub fn by_label(label: &str) -> Karat {
        Self::table()
            .by_label(label)
            .cloned()
            .unwrap_or_else(|_| panic!("standard karat {label} missing"))
    }

    pub fn k22() -> Karat {
        Self::by_label("22K")
    }

    pub fn k14() -> Karat {
        Self::by_label("14K")
    }
}

/// Fixture for price snapshots
pub struct SnapshotFixtures;

impl SnapshotFixtures {
    /// Fixed reference time (Mar 1, 2024 10:00 UTC)
    pub fn taken_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    /// TRY snapshot: gold 2900/2950, USD 42.50/42.80, EUR 46.00/46.40
    pub fn standard() -> PriceSnapshot {
        PriceSnapshot::new(Self::taken_at(), dec!(2900), dec!(2950))
            .with_usd(dec!(42.50), dec!(42.80))
            .with_eur(dec!(46.00), dec!(46.40))
    }

    /// Snapshot with round prices for hand-checked arithmetic
    pub fn round() -> PriceSnapshot {
        PriceSnapshot::new(Self::taken_at(), dec!(2000), dec!(2500))
            .with_usd(dec!(40), dec!(50))
    }
}

/// Fixture for money amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn try_amount(amount: Decimal) -> Money {
        Money::new(amount, Currency::TRY)
    }

    pub fn usd_100() -> Money {
        Money::new(dec!(100), Currency::USD)
    }

    pub fn try_zero() -> Money {
        Money::zero(Currency::TRY)
    }
}

/// Fixture for stock
pub struct StockFixtures;

impl StockFixtures {
    /// An empty bracelet pool for the given karat
    pub fn empty_pool(karat_id: KaratId) -> StockPoolBucket {
        StockPoolBucket::empty(PoolKey::new(ProductTypeId::new(), karat_id))
    }

    /// 22K pool holding 100 g at 96.6 HAS (avg 0.966)
    pub fn bracelet_pool() -> StockPoolBucket {
        let key = PoolKey::new(ProductTypeId::new(), KaratFixtures::k22().id);
        StockPoolBucket::new(key, dec!(100), dec!(96.6)).unwrap()
    }

    /// FIFO lot of 10 pieces worth 50 HAS (unit 5)
    pub fn coin_lot() -> Product {
        Product::fifo(ProductTypeId::new(), Unit::Piece, dec!(10), dec!(0.916), dec!(50)).unwrap()
    }

    /// A 14K ring worth 3.4 HAS
    pub fn ring() -> Product {
        Product::unique(ProductTypeId::new(), dec!(0.585), dec!(3.4)).unwrap()
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn party_id() -> PartyId {
        PartyId::new()
    }
}
