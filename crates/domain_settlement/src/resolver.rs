//! Settlement resolution
//!
//! Compares what a transaction should have brought in (or paid out) with what
//! actually changed hands and decides what happens to the difference. The
//! caller chooses the policy per transaction; the resolver never guesses.
//!
//! ```text
//!                 full_credit? ──yes──► FULL_CREDIT  (residual = expected)
//!                      │no
//!        |expected - actual| < tolerance ──► FULLY_SETTLED
//!                      │
//!         policy ──DISCOUNT──────► DISCOUNTED   (discount = difference)
//!                └─DEBT_OR_CREDIT─► PARTIAL      (residual = difference)
//! ```
//!
//! Overpayment follows the same two branches with a negative difference.
//! Every resolution satisfies `discount + debt_or_credit + collected == expected`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SettlementError;

/// What to do with a shortfall or excess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementPolicy {
    /// Shop absorbs the difference (discount, or profit/loss on overpayment)
    Discount,
    /// Difference is carried on the party's balance
    DebtOrCredit,
}

/// Terminal state of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementOutcome {
    FullySettled,
    Discounted,
    Partial,
    FullCredit,
}

/// Direction of a non-negligible difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Imbalance {
    None,
    Underpaid,
    Overpaid,
}

/// Caller's settlement choice for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub policy: SettlementPolicy,
    /// Whole amount goes on credit, nothing is collected
    pub full_credit: bool,
}

impl SettlementRequest {
    pub fn discount() -> Self {
        Self { policy: SettlementPolicy::Discount, full_credit: false }
    }

    pub fn debt_or_credit() -> Self {
        Self { policy: SettlementPolicy::DebtOrCredit, full_credit: false }
    }

    pub fn full_credit() -> Self {
        Self { policy: SettlementPolicy::DebtOrCredit, full_credit: true }
    }
}

/// Outcome of resolving expected against actual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: SettlementOutcome,
    pub policy: SettlementPolicy,
    pub expected: Decimal,
    /// What was actually paid
    pub actual: Decimal,
    /// Part of `expected` counted as collected
    pub collected: Decimal,
    /// `expected - actual`
    pub difference: Decimal,
    /// Absorbed by the shop; negative when an overpayment is kept as profit
    pub discount: Decimal,
    /// Carried on the party's balance; negative on overpayment
    pub debt_or_credit: Decimal,
    /// Sub-tolerance residue written off on a full settlement
    pub rounding_difference: Decimal,
}

impl Resolution {
    /// `discount + debt_or_credit + collected == expected`, exactly
    pub fn is_balanced(&self) -> bool {
        self.discount + self.debt_or_credit + self.collected == self.expected
    }

    pub fn imbalance(&self) -> Imbalance {
        match self.outcome {
            SettlementOutcome::FullySettled => Imbalance::None,
            SettlementOutcome::FullCredit => Imbalance::Underpaid,
            _ if self.difference > Decimal::ZERO => Imbalance::Underpaid,
            _ if self.difference < Decimal::ZERO => Imbalance::Overpaid,
            _ => Imbalance::None,
        }
    }

    /// True when something must be written to the party's balance
    pub fn has_residual(&self) -> bool {
        !self.debt_or_credit.is_zero()
    }
}

/// Resolves settlements against a fixed tolerance
#[derive(Debug, Clone, Copy)]
pub struct SettlementResolver {
    tolerance: Decimal,
}

impl SettlementResolver {
    /// Creates a resolver; differences strictly below `tolerance` are negligible
    pub fn new(tolerance: Decimal) -> Result<Self, SettlementError> {
        if tolerance < Decimal::ZERO {
            return Err(SettlementError::InvalidTolerance(tolerance));
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Resolves one settlement
    ///
    /// # Arguments
    ///
    /// * `expected` - Amount the transaction calls for
    /// * `actual` - Amount actually paid, in the same unit
    /// * `request` - Caller-selected policy and credit flag
    ///
    /// # Errors
    ///
    /// Negative amounts, or a full-credit request with a payment attached.
    pub fn resolve(
        &self,
        expected: Decimal,
        actual: Decimal,
        request: &SettlementRequest,
    ) -> Result<Resolution, SettlementError> {
        if expected < Decimal::ZERO {
            return Err(SettlementError::negative("expected_amount", expected));
        }
        if actual < Decimal::ZERO {
            return Err(SettlementError::negative("actual_amount", actual));
        }

        let difference = expected - actual;
        let mut resolution = Resolution {
            outcome: SettlementOutcome::FullySettled,
            policy: request.policy,
            expected,
            actual,
            collected: actual,
            difference,
            discount: Decimal::ZERO,
            debt_or_credit: Decimal::ZERO,
            rounding_difference: Decimal::ZERO,
        };

        if request.full_credit {
            if !actual.is_zero() {
                return Err(SettlementError::CreditWithPayment(actual));
            }
            resolution.outcome = SettlementOutcome::FullCredit;
            resolution.debt_or_credit = expected;
        } else if difference.is_zero() || difference.abs() < self.tolerance {
            resolution.collected = expected;
            resolution.rounding_difference = difference;
        } else {
            match request.policy {
                SettlementPolicy::Discount => {
                    resolution.outcome = SettlementOutcome::Discounted;
                    resolution.discount = difference;
                }
                SettlementPolicy::DebtOrCredit => {
                    resolution.outcome = SettlementOutcome::Partial;
                    resolution.debt_or_credit = difference;
                }
            }
        }

        debug!(
            outcome = ?resolution.outcome,
            expected = %expected,
            actual = %actual,
            "Settlement resolved"
        );

        Ok(resolution)
    }
}
