//! Collaborator ports
//!
//! The engine itself is pure; everything it reads (price snapshots, karats,
//! pool buckets, products, party balances) and everything it hands off (the
//! assembled transaction) crosses a port. Each domain crate declares its own
//! port traits extending [`DomainPort`], and adapters implement them.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            TransactionService                 │
//! └──────────────────────────────────────────────┘
//!          │ reads                    │ submits
//!          ▼                          ▼
//! ┌──────────────────┐      ┌──────────────────────┐
//! │  PricePort,      │      │  TransactionSinkPort │
//! │  StockPort, ...  │      │                      │
//! └──────────────────┘      └──────────────────────┘
//!          ▲                          ▲
//!          └──────── adapters ────────┘
//!        (remote API, database, in-memory)
//! ```

use std::fmt;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a collaborator
#[derive(Debug, Error)]
pub enum PortError {
    /// A referenced product, party or karat does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// The collaborator refused the data it was given
    #[error("Rejected by collaborator: {message}")]
    Validation { message: String, field: Option<String> },

    /// Stock or a balance moved between the read and the write
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The collaborator could not be reached or did not answer in time
    #[error("{service} unavailable: {message}")]
    Unavailable { service: String, message: String },

    #[error("Collaborator failure: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PortError {
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict { message: message.into() }
    }

    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::Unavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Wraps an adapter's own error
    pub fn internal(message: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// True when re-reading and retrying the whole transaction may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortError::Conflict { .. } | PortError::Unavailable { .. })
    }
}

/// Marker trait for all collaborator ports
///
/// Ports are shared across tasks behind `Arc<dyn ...>`.
pub trait DomainPort: Send + Sync + 'static {}
