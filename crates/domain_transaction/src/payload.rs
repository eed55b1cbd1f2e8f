//! Engine output
//!
//! The payload is what gets persisted. The stock and balance effects travel
//! beside it: the engine only computes them, the persistence side applies
//! them under its own lock. Stock effects are deltas against the state the
//! engine read, so the writer can refuse them when stock moved in between.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, IdempotencyKey, PartyId, ProductId, SnapshotId};
use domain_settlement::{BalanceDelta, PartyBalance, Resolution, SettlementOutcome, SettlementPolicy};
use domain_stock::{PoolKey, StockPoolBucket};

use crate::line::TransactionLine;
use crate::transaction_type::TransactionType;

/// Record submitted to `create_financial_transaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialTransactionPayload {
    pub type_code: TransactionType,
    pub party_id: Option<PartyId>,
    pub lines: Vec<TransactionLine>,
    /// Signed sum of line HAS, incoming positive
    pub total_has_amount: Decimal,
    /// HAS for reconciled types; base currency for EXCHANGE
    pub expected_amount: Decimal,
    /// HAS for reconciled types; foreign currency for EXCHANGE
    pub actual_amount: Decimal,
    pub discount_has: Decimal,
    pub debt_or_credit_has: Decimal,
    /// Sub-tolerance residue written off on a full settlement
    pub rounding_difference_has: Decimal,
    pub settlement_outcome: Option<SettlementOutcome>,
    pub settlement_policy: Option<SettlementPolicy>,
    /// Gold price applied, per HAS gram in the base currency
    pub has_price_used: Option<Decimal>,
    /// Currency of the cash leg
    pub currency: Currency,
    /// Cash as paid, in `currency`
    pub cash_amount: Decimal,
    /// Rate applied when `currency` is foreign
    pub exchange_rate: Option<Decimal>,
    /// HAS handed over as gold
    pub gold_paid_has: Decimal,
    /// Sum of pool sale profits, when the transaction sold pool gold
    pub profit_has: Option<Decimal>,
    pub snapshot_id: SnapshotId,
    pub idempotency_key: IdempotencyKey,
    pub created_at: DateTime<Utc>,
}

impl FinancialTransactionPayload {
    /// `discount + debt_or_credit + collected == expected`
    pub fn is_balanced(&self, collected_has: Decimal) -> bool {
        self.discount_has + self.debt_or_credit_has + collected_has == self.expected_amount
    }
}

/// Net change to one pool bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUpdate {
    /// Bucket as read; the deltas were computed against it
    pub before: StockPoolBucket,
    /// Deposits positive, withdrawals negative
    pub weight_delta_gram: Decimal,
    pub cost_delta_has: Decimal,
}

impl PoolUpdate {
    pub fn key(&self) -> PoolKey {
        self.before.key
    }

    /// Bucket once the change is applied to `before`
    pub fn after(&self) -> StockPoolBucket {
        StockPoolBucket {
            key: self.before.key,
            total_weight_gram: self.before.total_weight_gram + self.weight_delta_gram,
            total_cost_has: self.before.total_cost_has + self.cost_delta_has,
        }
    }

    /// Weight taken out of the pool, zero for a net deposit
    pub fn withdrawn_gram(&self) -> Decimal {
        (-self.weight_delta_gram).max(Decimal::ZERO)
    }
}

/// Units sold from one lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotUpdate {
    pub product_id: ProductId,
    /// Remaining quantity as read
    pub remaining_before: Decimal,
    pub quantity_sold: Decimal,
}

impl LotUpdate {
    pub fn remaining_quantity(&self) -> Decimal {
        self.remaining_before - self.quantity_sold
    }
}

/// Everything one engine run produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub payload: FinancialTransactionPayload,
    /// Net change per pool bucket touched, in first-touch order
    pub pool_updates: Vec<PoolUpdate>,
    /// Units sold per lot touched, in first-touch order
    pub lot_updates: Vec<LotUpdate>,
    pub resolution: Option<Resolution>,
    pub balance_delta: Option<BalanceDelta>,
    /// Party balance after `balance_delta`
    pub party_balance: Option<PartyBalance>,
}
