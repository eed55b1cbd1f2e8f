//! Core Kernel
//!
//! Types every engine crate shares: cash amounts, entity ids, the error a
//! collaborator port reports, and the engine's configuration.

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;
pub mod config;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{
    KaratId, SnapshotId, ProductId, ProductTypeId, PartyId,
    TransactionId, IdempotencyKey,
};
pub use error::CoreError;
pub use ports::{PortError, DomainPort};
pub use config::EngineConfig;
