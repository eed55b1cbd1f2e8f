//! Transaction service
//!
//! Resolves the ids in a request through the collaborator ports, runs the
//! engine once and hands the payload to the sink. The service holds no
//! state of its own; concurrent requests are independent, and the sink is
//! expected to re-check stock when it applies the effects.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{IdempotencyKey, KaratId, PartyId, PortError, ProductId, ProductTypeId, TransactionId};
use domain_settlement::{Payment, SettlementRequest};
use domain_stock::{TrackType, Unit};
use domain_valuation::{KaratTable, Labor, MaterialBasis, PriceSnapshot, ValuationError};

use crate::draft::{DraftLine, ExchangeOrder, ExpectedAmount, ItemPurchase, TransactionDraft};
use crate::engine::ReconciliationEngine;
use crate::error::EngineError;
use crate::payload::TransactionOutcome;
use crate::ports::{KaratPort, PartyBalancePort, PricePort, StockPort, TransactionSinkPort};
use crate::transaction_type::TransactionType;

/// A line as entered, referring to stock and karats by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineRequest {
    PoolPurchase {
        product_type_id: ProductTypeId,
        karat_id: KaratId,
        weight_gram: Decimal,
        labor_per_gram: Decimal,
    },
    PoolSale {
        product_type_id: ProductTypeId,
        karat_id: KaratId,
        weight_gram: Decimal,
        labor_per_gram: Decimal,
    },
    LotSale {
        product_id: ProductId,
        quantity: Decimal,
    },
    ItemPurchase {
        product_type_id: ProductTypeId,
        /// Required unless `purchase_has` is given
        karat_id: Option<KaratId>,
        track_type: TrackType,
        unit: Unit,
        quantity: Decimal,
        weight_gram: Decimal,
        labor: Labor,
        /// Set for non-gold items, which are bought at a stated HAS value
        purchase_has: Option<Decimal>,
    },
    Scrap {
        karat_id: KaratId,
        weight_gram: Decimal,
    },
}

/// A transaction as entered at the counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub transaction_type: TransactionType,
    pub party_id: Option<PartyId>,
    #[serde(default)]
    pub lines: Vec<LineRequest>,
    pub payment: Payment,
    pub expected: Option<ExpectedAmount>,
    pub settlement: SettlementRequest,
    pub exchange: Option<ExchangeOrder>,
    pub idempotency_key: IdempotencyKey,
}

impl TransactionRequest {
    pub fn new(transaction_type: TransactionType, payment: Payment) -> Self {
        Self {
            transaction_type,
            party_id: None,
            lines: Vec::new(),
            payment,
            expected: None,
            settlement: SettlementRequest::discount(),
            exchange: None,
            idempotency_key: IdempotencyKey::new_v7(),
        }
    }

    pub fn with_party(mut self, party_id: PartyId) -> Self {
        self.party_id = Some(party_id);
        self
    }

    pub fn with_line(mut self, line: LineRequest) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_expected(mut self, expected: ExpectedAmount) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_settlement(mut self, settlement: SettlementRequest) -> Self {
        self.settlement = settlement;
        self
    }

    pub fn with_exchange(mut self, order: ExchangeOrder) -> Self {
        self.exchange = Some(order);
        self
    }

    pub fn with_idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = key;
        self
    }
}

/// A transaction accepted by the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedTransaction {
    pub transaction_id: TransactionId,
    pub outcome: TransactionOutcome,
}

/// Application service for recording transactions
pub struct TransactionService {
    engine: ReconciliationEngine,
    prices: Arc<dyn PricePort>,
    karats: Arc<dyn KaratPort>,
    stock: Arc<dyn StockPort>,
    parties: Arc<dyn PartyBalancePort>,
    sink: Arc<dyn TransactionSinkPort>,
}

impl TransactionService {
    pub fn new(
        engine: ReconciliationEngine,
        prices: Arc<dyn PricePort>,
        karats: Arc<dyn KaratPort>,
        stock: Arc<dyn StockPort>,
        parties: Arc<dyn PartyBalancePort>,
        sink: Arc<dyn TransactionSinkPort>,
    ) -> Self {
        Self { engine, prices, karats, stock, parties, sink }
    }

    /// Runs the engine without persisting anything
    #[instrument(skip(self, request), fields(type_code = %request.transaction_type))]
    pub async fn preview(&self, request: &TransactionRequest) -> Result<TransactionOutcome, EngineError> {
        let (snapshot, draft) = self.resolve(request).await?;
        self.engine.process(&snapshot, &draft)
    }

    /// Runs the engine and submits the payload
    ///
    /// # Errors
    ///
    /// Engine errors as from [`ReconciliationEngine::process`], plus
    /// collaborator failures. Missing products, parties and karats are
    /// reported as validation errors naming the field.
    #[instrument(
        skip(self, request),
        fields(type_code = %request.transaction_type, idempotency_key = %request.idempotency_key)
    )]
    pub async fn submit(&self, request: TransactionRequest) -> Result<ProcessedTransaction, EngineError> {
        let (snapshot, draft) = self.resolve(&request).await?;

        let outcome = match self.engine.process(&snapshot, &draft) {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_fatal() {
                    warn!(kind = %e.kind(), error = %e, "Transaction rejected");
                }
                return Err(e);
            }
        };

        let transaction_id = match self.sink.create_financial_transaction(outcome.payload.clone()).await {
            Ok(id) => id,
            Err(e) => {
                warn!(retryable = e.is_retryable(), error = %e, "Sink refused transaction");
                return Err(e.into());
            }
        };

        info!(transaction_id = %transaction_id, "Transaction submitted");

        Ok(ProcessedTransaction { transaction_id, outcome })
    }

    /// Fetches everything the request refers to and builds the draft
    async fn resolve(&self, request: &TransactionRequest) -> Result<(PriceSnapshot, TransactionDraft), EngineError> {
        let snapshot = self
            .prices
            .get_latest_price_snapshot()
            .await?
            .ok_or(ValuationError::MissingSnapshot)?;

        let karats = if request.lines.iter().any(needs_karat) {
            Some(KaratTable::new(self.karats.get_karats().await?)?)
        } else {
            None
        };

        let mut lines = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            lines.push(self.resolve_line(line, karats.as_ref()).await?);
        }

        let party = match request.party_id {
            Some(party_id) => Some(
                self.parties
                    .get_party_balance(party_id)
                    .await
                    .map_err(|e| lookup_error(e, "party_id"))?,
            ),
            None => None,
        };

        debug!(lines = lines.len(), snapshot_id = %snapshot.id, "Request resolved");

        let draft = TransactionDraft {
            transaction_type: request.transaction_type,
            party,
            lines,
            payment: request.payment.clone(),
            expected: request.expected,
            settlement: request.settlement,
            exchange: request.exchange,
            idempotency_key: request.idempotency_key,
            requested_at: Utc::now(),
        };

        Ok((snapshot, draft))
    }

    async fn resolve_line(
        &self,
        line: &LineRequest,
        karats: Option<&KaratTable>,
    ) -> Result<DraftLine, EngineError> {
        let fineness = |karat_id: KaratId| -> Result<Decimal, EngineError> {
            let table = karats.ok_or(ValuationError::UnknownKarat(karat_id.to_string()))?;
            Ok(table.get(karat_id)?.fineness)
        };

        let draft_line = match line {
            LineRequest::PoolPurchase { product_type_id, karat_id, weight_gram, labor_per_gram } => {
                DraftLine::PoolPurchase {
                    bucket: self.pool(*product_type_id, *karat_id).await?,
                    weight_gram: *weight_gram,
                    fineness: fineness(*karat_id)?,
                    labor_per_gram: *labor_per_gram,
                }
            }
            LineRequest::PoolSale { product_type_id, karat_id, weight_gram, labor_per_gram } => {
                DraftLine::PoolSale {
                    bucket: self.pool(*product_type_id, *karat_id).await?,
                    weight_gram: *weight_gram,
                    fineness: fineness(*karat_id)?,
                    labor_per_gram: *labor_per_gram,
                }
            }
            LineRequest::LotSale { product_id, quantity } => DraftLine::LotSale {
                product: self
                    .stock
                    .get_product(*product_id)
                    .await
                    .map_err(|e| lookup_error(e, "product_id"))?,
                quantity: *quantity,
            },
            LineRequest::ItemPurchase {
                product_type_id,
                karat_id,
                track_type,
                unit,
                quantity,
                weight_gram,
                labor,
                purchase_has,
            } => {
                let basis = match (purchase_has, karat_id) {
                    (Some(purchase_has), _) => MaterialBasis::NonGold {
                        weight_gram: *weight_gram,
                        purchase_has: *purchase_has,
                    },
                    (None, Some(karat_id)) => MaterialBasis::Gold {
                        weight_gram: *weight_gram,
                        fineness: fineness(*karat_id)?,
                    },
                    (None, None) => {
                        return Err(EngineError::validation_field(
                            "a gold item needs a karat",
                            "karat_id",
                        ))
                    }
                };
                DraftLine::ItemPurchase(ItemPurchase {
                    product_type_id: *product_type_id,
                    karat_id: *karat_id,
                    track_type: *track_type,
                    unit: *unit,
                    quantity: *quantity,
                    basis,
                    labor: *labor,
                })
            }
            LineRequest::Scrap { karat_id, weight_gram } => DraftLine::Scrap {
                karat_id: Some(*karat_id),
                weight_gram: *weight_gram,
                fineness: fineness(*karat_id)?,
            },
        };

        Ok(draft_line)
    }

    async fn pool(
        &self,
        product_type_id: ProductTypeId,
        karat_id: KaratId,
    ) -> Result<domain_stock::StockPoolBucket, EngineError> {
        Ok(self.stock.get_stock_pool_info(product_type_id, karat_id).await?)
    }
}

fn needs_karat(line: &LineRequest) -> bool {
    match line {
        LineRequest::LotSale { .. } => false,
        LineRequest::ItemPurchase { karat_id, purchase_has, .. } => {
            karat_id.is_some() && purchase_has.is_none()
        }
        _ => true,
    }
}

/// A missing referenced entity is the user's input at fault, not the collaborator
fn lookup_error(error: PortError, field: &str) -> EngineError {
    if error.is_not_found() {
        EngineError::validation_field(error.to_string(), field)
    } else {
        error.into()
    }
}
