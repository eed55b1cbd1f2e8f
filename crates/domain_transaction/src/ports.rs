//! Collaborator ports
//!
//! The engine reads reference data and stock state through these traits and
//! hands the finished payload to a sink. Persistence, remote APIs and caches
//! live behind them.
//!
//! ```text
//!               ┌──────────────────────┐
//!  PricePort ──►│                      │
//!  KaratPort ──►│  TransactionService  │──► TransactionSinkPort
//!  StockPort ──►│                      │
//!  PartyBalancePort ─►                 │
//!               └──────────────────────┘
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, KaratId, PartyId, PortError, ProductId, ProductTypeId, TransactionId};
use domain_settlement::PartyBalance;
use domain_stock::{Product, StockPoolBucket};
use domain_valuation::{Karat, PriceSnapshot};

use crate::payload::FinancialTransactionPayload;

/// Source of gold and currency prices
#[async_trait]
pub trait PricePort: DomainPort {
    /// Latest snapshot, `None` when no prices have been fetched yet
    async fn get_latest_price_snapshot(&self) -> Result<Option<PriceSnapshot>, PortError>;
}

/// Source of the karat table
#[async_trait]
pub trait KaratPort: DomainPort {
    async fn get_karats(&self) -> Result<Vec<Karat>, PortError>;
}

/// Read access to pool buckets and products
#[async_trait]
pub trait StockPort: DomainPort {
    /// Current totals of a pool; a pool that never held stock is empty, not missing
    async fn get_stock_pool_info(
        &self,
        product_type_id: ProductTypeId,
        karat_id: KaratId,
    ) -> Result<StockPoolBucket, PortError>;

    async fn get_product(&self, product_id: ProductId) -> Result<Product, PortError>;
}

/// Read access to party balances
#[async_trait]
pub trait PartyBalancePort: DomainPort {
    async fn get_party_balance(&self, party_id: PartyId) -> Result<PartyBalance, PortError>;
}

/// Destination for finished transactions
#[async_trait]
pub trait TransactionSinkPort: DomainPort {
    /// Persists the payload
    ///
    /// Submitting the same idempotency key twice must return the id of the
    /// first transaction without writing a second one.
    async fn create_financial_transaction(
        &self,
        payload: FinancialTransactionPayload,
    ) -> Result<TransactionId, PortError>;
}
