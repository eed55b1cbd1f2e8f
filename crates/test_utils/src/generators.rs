//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Duration, Utc};
use core_kernel::{Currency, Money};
use domain_settlement::SettlementRequest;
use domain_valuation::PriceSnapshot;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for weights between 0.001 g and 1 kg, milligram resolution
pub fn weight_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|mg| Decimal::new(mg, 3))
}

/// Strategy for fineness in (0, 1], three decimal places
pub fn fineness_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1000i64).prop_map(|n| Decimal::new(n, 3))
}

/// Strategy for the fineness of a standard karat
pub fn standard_fineness_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::new(995, 3)),
        Just(Decimal::new(916, 3)),
        Just(Decimal::new(875, 3)),
        Just(Decimal::new(750, 3)),
        Just(Decimal::new(585, 3)),
        Just(Decimal::new(333, 3)),
    ]
}

/// Strategy for per-gram labor, 0 to 0.2 HAS
pub fn labor_per_gram_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=200i64).prop_map(|n| Decimal::new(n, 3))
}

/// Strategy for non-negative HAS amounts up to 10 kg, milligram resolution
pub fn has_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|mg| Decimal::new(mg, 3))
}

/// Strategy for positive exchange rates, 0.0001 to 1000
pub fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Strategy for the two non-credit settlement requests
pub fn settlement_request_strategy() -> impl Strategy<Value = SettlementRequest> {
    prop_oneof![
        Just(SettlementRequest::discount()),
        Just(SettlementRequest::debt_or_credit()),
    ]
}

/// Strategy for TRY cash amounts, kuruş resolution
pub fn try_money_strategy() -> impl Strategy<Value = Money> {
    (0i64..100_000_000i64).prop_map(|kurus| Money::new(Decimal::new(kurus, 2), Currency::TRY))
}

/// Strategy for valid snapshots with a gold spread and USD/EUR quotes
pub fn price_snapshot_strategy() -> impl Strategy<Value = PriceSnapshot> {
    (
        1_000i64..5_000i64,
        0i64..200i64,
        rate_strategy(),
        rate_strategy(),
    )
        .prop_map(|(buy, spread, usd, eur)| {
            let buy = Decimal::from(buy);
            PriceSnapshot::new(Utc::now() - Duration::seconds(5), buy, buy + Decimal::from(spread))
                .with_usd(usd, usd)
                .with_eur(eur, eur)
        })
}
