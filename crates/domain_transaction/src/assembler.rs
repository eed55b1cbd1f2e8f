//! Transaction assembler
//!
//! Turns valued lines, the collected payment and the settlement resolution
//! into the persisted payload, then checks that the result adds up. A failed
//! check means the pipeline itself is wrong, so it is reported as a
//! `ReconciliationInvariant` error rather than a validation problem.

use rust_decimal::Decimal;

use domain_settlement::{CollectedPayment, Resolution};
use domain_valuation::{PriceSide, PriceSnapshot};

use crate::draft::{ExchangeOrder, TransactionDraft};
use crate::error::EngineError;
use crate::line::TransactionLine;
use crate::payload::FinancialTransactionPayload;

/// Pieces of a reconciled transaction
#[derive(Debug, Clone)]
pub struct ReconciledParts<'a> {
    pub draft: &'a TransactionDraft,
    pub snapshot: &'a PriceSnapshot,
    pub gold_side: PriceSide,
    pub lines: Vec<TransactionLine>,
    pub collected: CollectedPayment,
    pub resolution: Resolution,
}

/// Builds the payload for a reconciled transaction and verifies it
pub fn assemble(parts: ReconciledParts<'_>) -> Result<FinancialTransactionPayload, EngineError> {
    let ReconciledParts { draft, snapshot, gold_side, lines, collected, resolution } = parts;

    let total_has_amount: Decimal = lines.iter().map(TransactionLine::signed_has).sum();
    let profits: Vec<Decimal> = lines.iter().filter_map(|l| l.profit_has).collect();
    let profit_has = if profits.is_empty() {
        None
    } else {
        Some(profits.into_iter().sum())
    };

    let payload = FinancialTransactionPayload {
        type_code: draft.transaction_type,
        party_id: draft.party_id(),
        lines,
        total_has_amount,
        expected_amount: resolution.expected,
        actual_amount: resolution.actual,
        discount_has: resolution.discount,
        debt_or_credit_has: resolution.debt_or_credit,
        rounding_difference_has: resolution.rounding_difference,
        settlement_outcome: Some(resolution.outcome),
        settlement_policy: Some(resolution.policy),
        has_price_used: Some(snapshot.has_price(gold_side)),
        currency: collected.currency,
        cash_amount: collected.cash_amount,
        exchange_rate: collected.exchange_rate,
        gold_paid_has: collected.gold_has,
        profit_has,
        snapshot_id: snapshot.id,
        idempotency_key: draft.idempotency_key,
        created_at: draft.requested_at,
    };

    verify(&payload, Some(&resolution))?;
    Ok(payload)
}

/// Builds the payload for a currency exchange
pub fn assemble_exchange(
    draft: &TransactionDraft,
    snapshot: &PriceSnapshot,
    order: &ExchangeOrder,
    rate: Decimal,
    base_amount: Decimal,
) -> Result<FinancialTransactionPayload, EngineError> {
    let payload = FinancialTransactionPayload {
        type_code: draft.transaction_type,
        party_id: draft.party_id(),
        lines: Vec::new(),
        total_has_amount: Decimal::ZERO,
        expected_amount: base_amount,
        actual_amount: order.foreign.amount(),
        discount_has: Decimal::ZERO,
        debt_or_credit_has: Decimal::ZERO,
        rounding_difference_has: Decimal::ZERO,
        settlement_outcome: None,
        settlement_policy: None,
        has_price_used: None,
        currency: order.foreign.currency(),
        cash_amount: order.foreign.amount(),
        exchange_rate: Some(rate),
        gold_paid_has: Decimal::ZERO,
        profit_has: None,
        snapshot_id: snapshot.id,
        idempotency_key: draft.idempotency_key,
        created_at: draft.requested_at,
    };

    verify(&payload, None)?;
    Ok(payload)
}

/// Checks the internal consistency of a payload
///
/// # Errors
///
/// `ReconciliationInvariant` naming the first check that failed.
pub fn verify(
    payload: &FinancialTransactionPayload,
    resolution: Option<&Resolution>,
) -> Result<(), EngineError> {
    for (index, line) in payload.lines.iter().enumerate() {
        if line.line_total_has < Decimal::ZERO {
            return Err(EngineError::invariant(format!(
                "line {} has negative value {}",
                index, line.line_total_has
            )));
        }
        if line.material_has + line.labor_has_value != line.line_total_has {
            return Err(EngineError::invariant(format!(
                "line {}: material {} + labor {} != total {}",
                index, line.material_has, line.labor_has_value, line.line_total_has
            )));
        }
    }

    let signed_sum: Decimal = payload.lines.iter().map(TransactionLine::signed_has).sum();
    if signed_sum != payload.total_has_amount {
        return Err(EngineError::invariant(format!(
            "total_has_amount {} != signed line sum {}",
            payload.total_has_amount, signed_sum
        )));
    }

    if payload.type_code.is_trade() && payload.total_has_amount.abs() != payload.expected_amount {
        return Err(EngineError::invariant(format!(
            "expected_amount {} does not match line total {}",
            payload.expected_amount, payload.total_has_amount
        )));
    }

    match (payload.type_code.is_reconciled(), resolution) {
        (true, Some(resolution)) => {
            if !resolution.is_balanced() || !payload.is_balanced(resolution.collected) {
                return Err(EngineError::invariant(format!(
                    "discount {} + debt_or_credit {} + collected {} != expected {}",
                    payload.discount_has,
                    payload.debt_or_credit_has,
                    resolution.collected,
                    payload.expected_amount
                )));
            }
        }
        (true, None) => {
            return Err(EngineError::invariant(format!(
                "{} transaction assembled without a settlement",
                payload.type_code
            )));
        }
        (false, _) => {
            if !payload.discount_has.is_zero() || !payload.debt_or_credit_has.is_zero() {
                return Err(EngineError::invariant(format!(
                    "{} transaction carries a settlement",
                    payload.type_code
                )));
            }
        }
    }

    Ok(())
}
