//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for engine results that give
//! more meaningful error messages than standard assertions.

use domain_stock::StockPoolBucket;
use domain_transaction::{EngineError, ErrorKind, TransactionOutcome};
use rust_decimal::Decimal;

/// Asserts that two HAS amounts are within `tolerance` of each other
pub fn assert_has_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "HAS amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that a reconciled outcome balances exactly
///
/// # Panics
///
/// Panics if the outcome has no resolution or
/// `discount + debt_or_credit + collected != expected`.
pub fn assert_settlement_complete(outcome: &TransactionOutcome) {
    let resolution = outcome
        .resolution
        .as_ref()
        .expect("Expected a reconciled transaction");
    let payload = &outcome.payload;

    assert_eq!(
        payload.discount_has + payload.debt_or_credit_has + resolution.collected,
        payload.expected_amount,
        "Settlement incomplete: discount={}, debt_or_credit={}, collected={}, expected={}",
        payload.discount_has,
        payload.debt_or_credit_has,
        resolution.collected,
        payload.expected_amount
    );
}

/// Asserts that the signed line sum equals the payload total
pub fn assert_lines_sum_to_total(outcome: &TransactionOutcome) {
    let sum: Decimal = outcome.payload.lines.iter().map(|l| l.signed_has()).sum();
    assert_eq!(
        sum, outcome.payload.total_has_amount,
        "Signed line sum ({}) doesn't equal total_has_amount ({})",
        sum, outcome.payload.total_has_amount
    );
}

/// Asserts a pool's average cost, compared at `dp` decimal places
pub fn assert_pool_average(bucket: &StockPoolBucket, expected: Decimal, dp: u32) {
    let actual = bucket.avg_cost_per_gram().round_dp(dp);
    assert_eq!(
        actual,
        expected.round_dp(dp),
        "Pool {} average: {} g / {} HAS gives {}, expected {}",
        bucket.key,
        bucket.total_weight_gram,
        bucket.total_cost_has,
        actual,
        expected
    );
}

/// Asserts an error's kind, and its field when given
pub fn assert_error_kind(error: &EngineError, kind: ErrorKind, field: Option<&str>) {
    assert_eq!(error.kind(), kind, "Unexpected error kind for: {}", error);
    if field.is_some() {
        assert_eq!(error.field(), field, "Unexpected error field for: {}", error);
    }
}
