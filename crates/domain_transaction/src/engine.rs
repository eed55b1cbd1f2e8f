//! The valuation and reconciliation pipeline
//!
//! ```text
//! snapshot + draft
//!       │
//!       ▼
//!   check snapshot ──► check shape ──► value lines ──► collect payment
//!                                       (pool/lot)          │
//!                                                           ▼
//!                        assemble + verify ◄── balance ◄── resolve
//! ```
//!
//! The engine is pure. Pool buckets, products and the party balance come in
//! as values and their changes come back out, each paired with the state it
//! was computed from; nothing is written. Lines
//! touching the same bucket or lot are applied in order against a working
//! copy, so a second withdrawal sees the first one's effect.

use rust_decimal::Decimal;
use tracing::{debug, info};

use core_kernel::{CoreError, EngineConfig};
use domain_settlement::{
    collect, BalanceDelta, CollectedPayment, PartyBalance, Resolution, SettlementResolver,
};
use domain_stock::{sell, unit_has, PoolKey, Product, StockError, StockPoolBucket, TrackType, Unit};
use domain_valuation::{
    convert_to_base, currency_to_has, to_base, valuate, valuate_basis, Labor, PriceSide,
    PriceSnapshot,
};

use crate::assembler::{self, ReconciledParts};
use crate::draft::{DraftLine, ExpectedAmount, ItemPurchase, TransactionDraft};
use crate::error::EngineError;
use crate::line::{LineKind, TransactionLine};
use crate::payload::{LotUpdate, PoolUpdate, TransactionOutcome};
use crate::transaction_type::TransactionType;

/// Runs drafts through the pipeline under one configuration
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: EngineConfig,
}

impl ReconciliationEngine {
    /// Creates an engine, rejecting unusable configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Processes one transaction draft
    ///
    /// # Arguments
    ///
    /// * `snapshot` - Prices to value the transaction at
    /// * `draft` - The resolved transaction
    ///
    /// # Returns
    ///
    /// The payload to persist together with the stock and balance effects
    /// the persistence side must apply.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`]; nothing is applied on error.
    pub fn process(
        &self,
        snapshot: &PriceSnapshot,
        draft: &TransactionDraft,
    ) -> Result<TransactionOutcome, EngineError> {
        self.check_snapshot(snapshot, draft)?;
        check_shape(draft)?;

        let outcome = match draft.transaction_type {
            TransactionType::Exchange => self.process_exchange(snapshot, draft)?,
            _ => self.process_reconciled(snapshot, draft)?,
        };

        info!(
            type_code = %outcome.payload.type_code,
            idempotency_key = %outcome.payload.idempotency_key,
            total_has = %outcome.payload.total_has_amount,
            outcome = ?outcome.payload.settlement_outcome,
            "Transaction assembled"
        );

        Ok(outcome)
    }

    fn check_snapshot(&self, snapshot: &PriceSnapshot, draft: &TransactionDraft) -> Result<(), EngineError> {
        if snapshot.base_currency != self.config.base_currency {
            return Err(CoreError::configuration(format!(
                "price snapshot is quoted in {}, engine is configured for {}",
                snapshot.base_currency, self.config.base_currency
            ))
            .into());
        }
        snapshot.validate()?;
        if let Some(max_age) = self.config.max_snapshot_age() {
            snapshot.ensure_fresh(draft.requested_at, max_age)?;
        }
        Ok(())
    }

    fn process_reconciled(
        &self,
        snapshot: &PriceSnapshot,
        draft: &TransactionDraft,
    ) -> Result<TransactionOutcome, EngineError> {
        let transaction_type = draft.transaction_type;
        let (gold_side, cash_side) = match (transaction_type.gold_price_side(), transaction_type.cash_side()) {
            (Some(gold), Some(cash)) => (gold, cash),
            _ => {
                return Err(EngineError::invariant(format!(
                    "{} has no price side",
                    transaction_type
                )))
            }
        };

        let mut stock = StockWorkingSet::default();
        let lines = draft
            .lines
            .iter()
            .map(|line| stock.apply(line))
            .collect::<Result<Vec<_>, _>>()?;

        let collected = collect(&draft.payment, snapshot, gold_side, cash_side)?;
        let expected = expected_has(draft, &lines, &collected, snapshot, gold_side, cash_side)?;

        let resolver = SettlementResolver::new(self.has_tolerance(snapshot, gold_side))?;
        let resolution = resolver.resolve(expected, collected.total_has, &draft.settlement)?;
        let (balance_delta, party_balance) = balance_effect(draft, &resolution)?;

        let payload = assembler::assemble(ReconciledParts {
            draft,
            snapshot,
            gold_side,
            lines,
            collected,
            resolution,
        })?;

        let (pool_updates, lot_updates) = stock.into_updates();

        Ok(TransactionOutcome {
            payload,
            pool_updates,
            lot_updates,
            resolution: Some(resolution),
            balance_delta,
            party_balance,
        })
    }

    fn process_exchange(
        &self,
        snapshot: &PriceSnapshot,
        draft: &TransactionDraft,
    ) -> Result<TransactionOutcome, EngineError> {
        let order = draft
            .exchange
            .as_ref()
            .ok_or_else(|| EngineError::validation_field("EXCHANGE requires an exchange order", "exchange"))?;

        if order.foreign.currency() == snapshot.base_currency {
            return Err(EngineError::validation_field(
                format!("cannot exchange {} against itself", order.foreign.currency()),
                "currency",
            ));
        }
        if !order.foreign.is_positive() {
            return Err(EngineError::validation_field(
                format!("exchange amount must be positive, got {}", order.foreign.amount()),
                "amount",
            ));
        }

        let rate = snapshot.require_rate(order.foreign.currency(), order.direction.rate_side())?;
        let base_amount = to_base(order.foreign.amount(), rate)?;

        debug!(
            currency = %order.foreign.currency(),
            direction = ?order.direction,
            rate = %rate,
            base_amount = %base_amount,
            "Currency exchanged"
        );

        let payload = assembler::assemble_exchange(draft, snapshot, order, rate, base_amount)?;

        Ok(TransactionOutcome {
            payload,
            pool_updates: Vec::new(),
            lot_updates: Vec::new(),
            resolution: None,
            balance_delta: None,
            party_balance: draft.party,
        })
    }

    /// Currency tolerance in HAS at the applied gold price, capped by `has_tolerance`
    fn has_tolerance(&self, snapshot: &PriceSnapshot, gold_side: PriceSide) -> Decimal {
        let price = snapshot.has_price(gold_side);
        if price <= Decimal::ZERO {
            return self.config.has_tolerance;
        }
        (self.config.currency_tolerance / price).min(self.config.has_tolerance)
    }
}

/// Rejects drafts whose parts do not fit the transaction type
fn check_shape(draft: &TransactionDraft) -> Result<(), EngineError> {
    let transaction_type = draft.transaction_type;

    for line in &draft.lines {
        let kind = line.kind();
        if !transaction_type.allows_line(kind) {
            return Err(EngineError::validation_field(
                format!("{} lines are not allowed on a {} transaction", kind, transaction_type),
                "lines",
            ));
        }
    }

    if transaction_type.is_trade() {
        if draft.lines.is_empty() {
            return Err(EngineError::validation_field(
                format!("{} requires at least one line", transaction_type),
                "lines",
            ));
        }
        if draft.expected.is_some() {
            return Err(EngineError::validation_field(
                format!("{} derives its expected amount from its lines", transaction_type),
                "expected_amount",
            ));
        }
    }

    if transaction_type.requires_party() && draft.party.is_none() {
        return Err(EngineError::validation_field(
            format!("{} requires a party", transaction_type),
            "party_id",
        ));
    }

    if transaction_type == TransactionType::Exchange && !draft.payment.is_empty() {
        return Err(EngineError::validation_field(
            "EXCHANGE takes its amount from the exchange order",
            "payment",
        ));
    }

    Ok(())
}

/// Expected HAS: line total for trades, the stated or paid amount otherwise
fn expected_has(
    draft: &TransactionDraft,
    lines: &[TransactionLine],
    collected: &CollectedPayment,
    snapshot: &PriceSnapshot,
    gold_side: PriceSide,
    cash_side: PriceSide,
) -> Result<Decimal, EngineError> {
    if draft.transaction_type.is_trade() {
        let total: Decimal = lines.iter().map(|l| l.line_total_has).sum();
        if total <= Decimal::ZERO {
            return Err(EngineError::validation_field(
                format!("{} lines must carry value, got {} HAS", draft.transaction_type, total),
                "lines",
            ));
        }
        return Ok(total);
    }

    let expected = match draft.expected {
        Some(ExpectedAmount::Has(has)) => has,
        Some(ExpectedAmount::Money(money)) => {
            let base = convert_to_base(money, snapshot, cash_side)?;
            currency_to_has(base.base.amount(), snapshot, gold_side)?
        }
        None => collected.total_has,
    };

    if expected <= Decimal::ZERO {
        return Err(EngineError::validation_field(
            format!("{} amount must be positive, got {}", draft.transaction_type, expected),
            "expected_amount",
        ));
    }
    Ok(expected)
}

/// Balance delta and resulting balance for the selected party
fn balance_effect(
    draft: &TransactionDraft,
    resolution: &Resolution,
) -> Result<(Option<BalanceDelta>, Option<PartyBalance>), EngineError> {
    let transaction_type = draft.transaction_type;
    let (payer, obligation) = match (transaction_type.payer(), transaction_type.obligation()) {
        (Some(payer), Some(obligation)) => (payer, obligation),
        _ => return Ok((None, draft.party)),
    };

    let Some(balance) = draft.party else {
        if resolution.has_residual() {
            return Err(EngineError::validation_field(
                format!(
                    "{} HAS would be carried on a balance but no party is selected",
                    resolution.debt_or_credit
                ),
                "party_id",
            ));
        }
        return Ok((None, None));
    };

    let delta = BalanceDelta::from_resolution(balance.party_id, payer, resolution, obligation);
    if delta.is_zero() {
        return Ok((None, Some(balance)));
    }
    let updated = balance.apply(&delta)?;

    debug!(
        party_id = %balance.party_id,
        delta = %delta.has_delta,
        balance = %updated.has_gold_balance,
        "Party balance moved"
    );

    Ok((Some(delta), Some(updated)))
}

/// Pool buckets and lots as they stand part-way through a transaction
///
/// Each entry keeps the state first read next to the current one.
#[derive(Debug, Default)]
struct StockWorkingSet {
    pools: Vec<(StockPoolBucket, StockPoolBucket)>,
    lots: Vec<(Product, Product)>,
}

impl StockWorkingSet {
    fn bucket(&self, seed: &StockPoolBucket) -> StockPoolBucket {
        self.pools
            .iter()
            .find(|(read, _)| read.key == seed.key)
            .map(|(_, current)| *current)
            .unwrap_or(*seed)
    }

    fn store_bucket(&mut self, seed: &StockPoolBucket, bucket: StockPoolBucket) {
        match self.pools.iter_mut().find(|(read, _)| read.key == bucket.key) {
            Some((_, slot)) => *slot = bucket,
            None => self.pools.push((*seed, bucket)),
        }
    }

    fn product(&self, seed: &Product) -> Product {
        self.lots
            .iter()
            .find(|(read, _)| read.id == seed.id)
            .map(|(_, current)| current.clone())
            .unwrap_or_else(|| seed.clone())
    }

    fn store_product(&mut self, seed: &Product, product: Product) {
        match self.lots.iter_mut().find(|(read, _)| read.id == product.id) {
            Some((_, slot)) => *slot = product,
            None => self.lots.push((seed.clone(), product)),
        }
    }

    fn into_updates(self) -> (Vec<PoolUpdate>, Vec<LotUpdate>) {
        let pools = self
            .pools
            .into_iter()
            .map(|(read, current)| PoolUpdate {
                before: read,
                weight_delta_gram: current.total_weight_gram - read.total_weight_gram,
                cost_delta_has: current.total_cost_has - read.total_cost_has,
            })
            .collect();
        let lots = self
            .lots
            .into_iter()
            .map(|(read, current)| LotUpdate {
                product_id: read.id,
                remaining_before: read.remaining_quantity,
                quantity_sold: read.remaining_quantity - current.remaining_quantity,
            })
            .collect();
        (pools, lots)
    }

    /// Values one line, updating the working copies it touches
    fn apply(&mut self, line: &DraftLine) -> Result<TransactionLine, EngineError> {
        let kind = line.kind();
        let valued = match line {
            DraftLine::PoolPurchase { bucket, weight_gram, fineness, labor_per_gram } => {
                let deposit = self.bucket(bucket).deposit(*weight_gram, *fineness, *labor_per_gram)?;
                self.store_bucket(bucket, deposit.bucket);
                pool_line(kind, bucket.key, *weight_gram, *fineness, deposit.material_has, deposit.labor_has)
            }
            DraftLine::PoolSale { bucket, weight_gram, fineness, labor_per_gram } => {
                let withdrawal = self.bucket(bucket).withdraw(*weight_gram, *fineness, *labor_per_gram)?;
                self.store_bucket(bucket, withdrawal.bucket);
                let material_has = *weight_gram * *fineness;
                let mut line = pool_line(
                    kind,
                    bucket.key,
                    *weight_gram,
                    *fineness,
                    material_has,
                    withdrawal.sale_has - material_has,
                );
                line.cost_of_goods_has = Some(withdrawal.cost_of_goods_has);
                line.profit_has = Some(withdrawal.profit_has);
                line
            }
            DraftLine::LotSale { product, quantity } => {
                let sale = sell(&self.product(product), *quantity)?;
                self.store_product(product, sale.product.clone());
                // Lot value is fixed per unit and not split into material and labor
                TransactionLine {
                    kind,
                    direction: kind.direction(),
                    product_id: Some(product.id),
                    product_type_id: Some(product.product_type_id),
                    karat_id: product.karat_id,
                    track_type: Some(product.track_type),
                    weight_gram: match product.unit {
                        Unit::Gram => sale.quantity_sold,
                        Unit::Piece => Decimal::ZERO,
                    },
                    quantity: sale.quantity_sold,
                    fineness: product.fineness,
                    material_has: sale.line_has,
                    labor_has_value: Decimal::ZERO,
                    line_total_has: sale.line_has,
                    unit_has: None,
                    cost_of_goods_has: None,
                    profit_has: None,
                }
            }
            DraftLine::ItemPurchase(item) => item_line(kind, item)?,
            DraftLine::Scrap { karat_id, weight_gram, fineness } => {
                let valuation = valuate(*weight_gram, *fineness, &Labor::none())?;
                TransactionLine {
                    kind,
                    direction: kind.direction(),
                    product_id: None,
                    product_type_id: None,
                    karat_id: *karat_id,
                    track_type: None,
                    weight_gram: *weight_gram,
                    quantity: *weight_gram,
                    fineness: *fineness,
                    material_has: valuation.material_has,
                    labor_has_value: Decimal::ZERO,
                    line_total_has: valuation.total_has,
                    unit_has: None,
                    cost_of_goods_has: None,
                    profit_has: None,
                }
            }
        };
        Ok(valued)
    }
}

fn pool_line(
    kind: LineKind,
    key: PoolKey,
    weight_gram: Decimal,
    fineness: Decimal,
    material_has: Decimal,
    labor_has: Decimal,
) -> TransactionLine {
    TransactionLine {
        kind,
        direction: kind.direction(),
        product_id: None,
        product_type_id: Some(key.product_type_id),
        karat_id: Some(key.karat_id),
        track_type: Some(TrackType::Pool),
        weight_gram,
        quantity: weight_gram,
        fineness,
        material_has,
        labor_has_value: labor_has,
        line_total_has: material_has + labor_has,
        unit_has: None,
        cost_of_goods_has: None,
        profit_has: None,
    }
}

fn item_line(kind: LineKind, item: &ItemPurchase) -> Result<TransactionLine, EngineError> {
    match item.track_type {
        TrackType::Pool => {
            return Err(EngineError::validation_field(
                "pool-tracked gold is bought with a pool purchase line",
                "track_type",
            ))
        }
        TrackType::Unique if item.quantity != Decimal::ONE => {
            return Err(EngineError::validation_field(
                format!("a unique item has quantity 1, got {}", item.quantity),
                "quantity",
            ))
        }
        _ => {}
    }
    if item.quantity <= Decimal::ZERO {
        return Err(StockError::non_positive("quantity", item.quantity).into());
    }
    if item.unit == Unit::Piece && !item.quantity.fract().is_zero() {
        return Err(StockError::FractionalPieceQuantity(item.quantity).into());
    }

    let valuation = valuate_basis(&item.basis, &item.labor)?;
    let per_unit = unit_has(valuation.total_has, item.quantity)?;

    Ok(TransactionLine {
        kind,
        direction: kind.direction(),
        product_id: None,
        product_type_id: Some(item.product_type_id),
        karat_id: item.karat_id,
        track_type: Some(item.track_type),
        weight_gram: item.basis.weight_gram(),
        quantity: item.quantity,
        fineness: item.basis.fineness().unwrap_or(Decimal::ZERO),
        material_has: valuation.material_has,
        labor_has_value: valuation.labor_has,
        line_total_has: valuation.total_has,
        unit_has: Some(per_unit),
        cost_of_goods_has: None,
        profit_has: None,
    })
}
