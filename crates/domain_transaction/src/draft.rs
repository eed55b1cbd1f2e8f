//! Engine input
//!
//! A draft is a transaction with every reference already resolved: pool
//! buckets, products, fineness and the party's balance are supplied as
//! values, so the engine needs nothing else to run.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{IdempotencyKey, KaratId, Money, PartyId, ProductTypeId};
use domain_settlement::{PartyBalance, Payment, SettlementRequest};
use domain_stock::{Product, StockPoolBucket, TrackType, Unit};
use domain_valuation::{Labor, MaterialBasis, PriceSide};

use crate::line::LineKind;
use crate::transaction_type::TransactionType;

/// A discrete item bought in as a new lot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPurchase {
    pub product_type_id: ProductTypeId,
    pub karat_id: Option<KaratId>,
    /// UNIQUE or FIFO
    pub track_type: TrackType,
    pub unit: Unit,
    pub quantity: Decimal,
    pub basis: MaterialBasis,
    pub labor: Labor,
}

/// One line of a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftLine {
    PoolPurchase {
        bucket: StockPoolBucket,
        weight_gram: Decimal,
        fineness: Decimal,
        labor_per_gram: Decimal,
    },
    PoolSale {
        bucket: StockPoolBucket,
        weight_gram: Decimal,
        fineness: Decimal,
        labor_per_gram: Decimal,
    },
    LotSale {
        product: Product,
        quantity: Decimal,
    },
    ItemPurchase(ItemPurchase),
    Scrap {
        karat_id: Option<KaratId>,
        weight_gram: Decimal,
        fineness: Decimal,
    },
}

impl DraftLine {
    pub fn kind(&self) -> LineKind {
        match self {
            DraftLine::PoolPurchase { .. } => LineKind::PoolPurchase,
            DraftLine::PoolSale { .. } => LineKind::PoolSale,
            DraftLine::LotSale { .. } => LineKind::LotSale,
            DraftLine::ItemPurchase(_) => LineKind::ItemPurchase,
            DraftLine::Scrap { .. } => LineKind::Scrap,
        }
    }
}

/// Amount a PAYMENT or RECEIPT is meant to settle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpectedAmount {
    Has(Decimal),
    Money(Money),
}

/// Which way foreign currency moves in an EXCHANGE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeDirection {
    /// Shop takes in foreign cash and pays out base currency
    ShopBuys,
    /// Shop pays out foreign cash and takes in base currency
    ShopSells,
}

impl ExchangeDirection {
    pub fn rate_side(&self) -> PriceSide {
        match self {
            ExchangeDirection::ShopBuys => PriceSide::Buy,
            ExchangeDirection::ShopSells => PriceSide::Sell,
        }
    }
}

/// Foreign currency bought or sold over the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeOrder {
    pub direction: ExchangeDirection,
    pub foreign: Money,
}

/// A fully resolved transaction ready for the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub transaction_type: TransactionType,
    /// Current balance of the selected party, if any
    pub party: Option<PartyBalance>,
    pub lines: Vec<DraftLine>,
    pub payment: Payment,
    /// PAYMENT/RECEIPT only; defaults to what was paid
    pub expected: Option<ExpectedAmount>,
    pub settlement: SettlementRequest,
    /// EXCHANGE only
    pub exchange: Option<ExchangeOrder>,
    pub idempotency_key: IdempotencyKey,
    /// Reference time for snapshot freshness and the payload timestamp
    pub requested_at: DateTime<Utc>,
}

impl TransactionDraft {
    pub fn new(transaction_type: TransactionType, payment: Payment) -> Self {
        Self {
            transaction_type,
            party: None,
            lines: Vec::new(),
            payment,
            expected: None,
            settlement: SettlementRequest::discount(),
            exchange: None,
            idempotency_key: IdempotencyKey::new_v7(),
            requested_at: Utc::now(),
        }
    }

    pub fn with_party(mut self, party: PartyBalance) -> Self {
        self.party = Some(party);
        self
    }

    pub fn with_line(mut self, line: DraftLine) -> Self {
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

    pub fn requested_at(mut self, at: DateTime<Utc>) -> Self {
        self.requested_at = at;
        self
    }

    pub fn party_id(&self) -> Option<PartyId> {
        self.party.map(|p| p.party_id)
    }
}
