//! In-memory collaborators
//!
//! Stand-ins for the persistence and price feeds behind the engine's ports.
//! State lives in `tokio::sync::RwLock`-guarded maps so the adapters can be
//! shared across tasks the way real adapters are.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{
    DomainPort, EngineConfig, IdempotencyKey, KaratId, PartyId, PortError, ProductId,
    ProductTypeId, TransactionId,
};
use domain_settlement::PartyBalance;
use domain_stock::{PoolKey, Product, StockPoolBucket};
use domain_transaction::{
    FinancialTransactionPayload, KaratPort, PartyBalancePort, PricePort, ReconciliationEngine,
    StockPort, TransactionOutcome, TransactionService, TransactionSinkPort,
};
use domain_valuation::{Karat, PriceSnapshot};

use crate::fixtures::{KaratFixtures, SnapshotFixtures};

/// Price feed holding at most one snapshot
#[derive(Debug, Default)]
pub struct InMemoryPricePort {
    snapshot: RwLock<Option<PriceSnapshot>>,
}

impl InMemoryPricePort {
    pub fn new(snapshot: Option<PriceSnapshot>) -> Self {
        Self { snapshot: RwLock::new(snapshot) }
    }

    /// Supersedes the current snapshot
    pub async fn publish(&self, snapshot: PriceSnapshot) {
        *self.snapshot.write().await = Some(snapshot);
    }
}

impl DomainPort for InMemoryPricePort {}

#[async_trait]
impl PricePort for InMemoryPricePort {
    async fn get_latest_price_snapshot(&self) -> Result<Option<PriceSnapshot>, PortError> {
        Ok(self.snapshot.read().await.clone())
    }
}

/// Fixed karat table
#[derive(Debug, Default)]
pub struct InMemoryKaratPort {
    karats: Vec<Karat>,
}

impl InMemoryKaratPort {
    pub fn new(karats: Vec<Karat>) -> Self {
        Self { karats }
    }
}

impl DomainPort for InMemoryKaratPort {}

#[async_trait]
impl KaratPort for InMemoryKaratPort {
    async fn get_karats(&self) -> Result<Vec<Karat>, PortError> {
        Ok(self.karats.clone())
    }
}

/// Pool buckets and products
#[derive(Debug, Default)]
pub struct InMemoryStockPort {
    pools: RwLock<HashMap<PoolKey, StockPoolBucket>>,
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryStockPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_pool(&self, bucket: StockPoolBucket) {
        self.pools.write().await.insert(bucket.key, bucket);
    }

    pub async fn put_product(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    /// Writes an outcome's stock effects, as the persistence side would
    ///
    /// Every pool must still hold the totals the outcome was computed from
    /// and every lot must still have the units sold. Otherwise nothing is
    /// written and the caller re-reads and retries.
    pub async fn apply(&self, outcome: &TransactionOutcome) -> Result<(), PortError> {
        let mut pools = self.pools.write().await;
        let mut products = self.products.write().await;

        for update in &outcome.pool_updates {
            let key = update.key();
            let stored = pools.get(&key).copied().unwrap_or_else(|| StockPoolBucket::empty(key));
            if stored != update.before {
                return Err(PortError::conflict(format!(
                    "pool {} holds {} g, outcome was computed against {} g",
                    key, stored.total_weight_gram, update.before.total_weight_gram
                )));
            }
        }
        for update in &outcome.lot_updates {
            let product = products.get(&update.product_id).ok_or_else(|| {
                PortError::conflict(format!("product {} was removed after it was read", update.product_id))
            })?;
            if product.remaining_quantity < update.quantity_sold {
                return Err(PortError::conflict(format!(
                    "product {} has {} left, {} were sold",
                    update.product_id, product.remaining_quantity, update.quantity_sold
                )));
            }
        }

        for update in &outcome.pool_updates {
            pools.insert(update.key(), update.after());
        }
        for update in &outcome.lot_updates {
            if let Some(product) = products.get_mut(&update.product_id) {
                product.remaining_quantity -= update.quantity_sold;
            }
        }
        Ok(())
    }
}

impl DomainPort for InMemoryStockPort {}

#[async_trait]
impl StockPort for InMemoryStockPort {
    async fn get_stock_pool_info(
        &self,
        product_type_id: ProductTypeId,
        karat_id: KaratId,
    ) -> Result<StockPoolBucket, PortError> {
        let key = PoolKey::new(product_type_id, karat_id);
        Ok(self
            .pools
            .read()
            .await
            .get(&key)
            .copied()
            .unwrap_or_else(|| StockPoolBucket::empty(key)))
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product, PortError> {
        self.products
            .read()
            .await
            .get(&product_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Product", product_id))
    }
}

/// Party balances
#[derive(Debug, Default)]
pub struct InMemoryPartyBalancePort {
    balances: RwLock<HashMap<PartyId, PartyBalance>>,
}

impl InMemoryPartyBalancePort {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, balance: PartyBalance) {
        self.balances.write().await.insert(balance.party_id, balance);
    }

    pub async fn get(&self, party_id: PartyId) -> Option<PartyBalance> {
        self.balances.read().await.get(&party_id).copied()
    }
}

impl DomainPort for InMemoryPartyBalancePort {}

#[async_trait]
impl PartyBalancePort for InMemoryPartyBalancePort {
    async fn get_party_balance(&self, party_id: PartyId) -> Result<PartyBalance, PortError> {
        self.get(party_id)
            .await
            .ok_or_else(|| PortError::not_found("Party", party_id))
    }
}

#[derive(Debug, Default)]
struct SinkState {
    by_key: HashMap<IdempotencyKey, TransactionId>,
    stored: HashMap<TransactionId, FinancialTransactionPayload>,
    writes: usize,
}

/// Transaction store that honours idempotency keys
#[derive(Debug, Default)]
pub struct InMemoryTransactionSink {
    state: RwLock<SinkState>,
}

impl InMemoryTransactionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: TransactionId) -> Option<FinancialTransactionPayload> {
        self.state.read().await.stored.get(&id).cloned()
    }

    /// Number of payloads actually written
    pub async fn writes(&self) -> usize {
        self.state.read().await.writes
    }
}

impl DomainPort for InMemoryTransactionSink {}

#[async_trait]
impl TransactionSinkPort for InMemoryTransactionSink {
    async fn create_financial_transaction(
        &self,
        payload: FinancialTransactionPayload,
    ) -> Result<TransactionId, PortError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.by_key.get(&payload.idempotency_key) {
            return Ok(*existing);
        }

        let id = TransactionId::new_v7();
        state.by_key.insert(payload.idempotency_key, id);
        state.stored.insert(id, payload);
        state.writes += 1;
        Ok(id)
    }
}

/// The in-memory collaborators wired to a service
pub struct TestBackOffice {
    pub prices: Arc<InMemoryPricePort>,
    pub karats: Arc<InMemoryKaratPort>,
    pub stock: Arc<InMemoryStockPort>,
    pub parties: Arc<InMemoryPartyBalancePort>,
    pub sink: Arc<InMemoryTransactionSink>,
}

impl Default for TestBackOffice {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackOffice {
    /// Standard karats and the standard snapshot, no stock, no parties
    pub fn new() -> Self {
        Self::with_snapshot(Some(SnapshotFixtures::standard()))
    }

    pub fn with_snapshot(snapshot: Option<PriceSnapshot>) -> Self {
        Self {
            prices: Arc::new(InMemoryPricePort::new(snapshot)),
            karats: Arc::new(InMemoryKaratPort::new(KaratFixtures::all())),
            stock: Arc::new(InMemoryStockPort::new()),
            parties: Arc::new(InMemoryPartyBalancePort::new()),
            sink: Arc::new(InMemoryTransactionSink::new()),
        }
    }

    /// A service over these collaborators with default configuration
    pub fn service(&self) -> TransactionService {
        self.service_with(EngineConfig::default())
    }

    pub fn service_with(&self, config: EngineConfig) -> TransactionService {
        let engine = ReconciliationEngine::new(config).expect("test engine config should be valid");
        TransactionService::new(
            engine,
            self.prices.clone(),
            self.karats.clone(),
            self.stock.clone(),
            self.parties.clone(),
            self.sink.clone(),
        )
    }
}
