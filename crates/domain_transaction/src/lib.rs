//! Transaction Domain
//!
//! Composes valuation, stock and settlement into one pipeline that turns a
//! counter transaction into a persistable record.
//!
//! # Transaction types
//!
//! | Type | Lines | Gold price | Reconciled |
//! |---|---|---|---|
//! | PURCHASE | pool purchase, item purchase | buy | yes |
//! | SALE | pool sale, lot sale | sell | yes |
//! | PAYMENT | none | sell | yes |
//! | RECEIPT | none | buy | yes |
//! | HURDA | scrap | buy | yes |
//! | EXCHANGE | none | n/a | no |
//!
//! # Layers
//!
//! - [`engine::ReconciliationEngine`]: pure, synchronous; draft in, outcome out
//! - [`assembler`]: builds the payload and checks it balances
//! - [`service::TransactionService`]: async; resolves ids through [`ports`]
//!   and submits the payload
//!
//! # Sign convention
//!
//! Line HAS is positive for gold coming in and negative for gold going out.
//! A party balance is positive when the shop owes the party.

pub mod transaction_type;
pub mod line;
pub mod draft;
pub mod payload;
pub mod assembler;
pub mod engine;
pub mod ports;
pub mod service;
pub mod error;

pub use transaction_type::TransactionType;
pub use line::{Direction, LineKind, TransactionLine};
pub use draft::{DraftLine, ExchangeDirection, ExchangeOrder, ExpectedAmount, ItemPurchase, TransactionDraft};
pub use payload::{FinancialTransactionPayload, LotUpdate, PoolUpdate, TransactionOutcome};
pub use engine::ReconciliationEngine;
pub use ports::{KaratPort, PartyBalancePort, PricePort, StockPort, TransactionSinkPort};
pub use service::{LineRequest, ProcessedTransaction, TransactionRequest, TransactionService};
pub use error::{EngineError, ErrorKind};
