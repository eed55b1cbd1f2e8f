//! Engine errors
//!
//! Each domain crate reports its own error type. `EngineError` wraps them and
//! sorts every failure into one of a handful of kinds so a caller knows
//! whether to re-prompt the user, abort the request, or retry later.

use std::fmt;

use thiserror::Error;

use core_kernel::{CoreError, PortError};
use domain_settlement::SettlementError;
use domain_stock::StockError;
use domain_valuation::ValuationError;

/// Broad classification of an engine failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Broken reference data: fineness, snapshot, exchange rate
    Configuration,
    /// Bad or incomplete user input
    Validation,
    /// Not enough stock; a kind of validation failure carrying the shortfall
    InsufficientStock,
    /// The assembled transaction does not balance
    ReconciliationInvariant,
    /// A collaborator could not be reached or failed
    Collaborator,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Validation => "validation",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::ReconciliationInvariant => "reconciliation_invariant",
            ErrorKind::Collaborator => "collaborator",
        };
        f.write_str(name)
    }
}

/// Errors returned by the engine and the transaction service
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Reconciliation invariant violated: {0}")]
    ReconciliationInvariant(String),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        EngineError::ReconciliationInvariant(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Valuation(e) if e.is_configuration() => ErrorKind::Configuration,
            EngineError::Valuation(_) => ErrorKind::Validation,
            EngineError::Stock(StockError::InsufficientStock { .. }) => ErrorKind::InsufficientStock,
            EngineError::Stock(StockError::Valuation(e)) if e.is_configuration() => {
                ErrorKind::Configuration
            }
            EngineError::Stock(_) => ErrorKind::Validation,
            EngineError::Settlement(e) if e.is_configuration() => ErrorKind::Configuration,
            EngineError::Settlement(_) => ErrorKind::Validation,
            EngineError::Core(e) if e.is_configuration() => ErrorKind::Configuration,
            EngineError::Core(_) => ErrorKind::Validation,
            EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::ReconciliationInvariant(_) => ErrorKind::ReconciliationInvariant,
            EngineError::Port(PortError::Validation { .. }) => ErrorKind::Validation,
            EngineError::Port(_) => ErrorKind::Collaborator,
        }
    }

    /// Fatal errors abort the request; nothing the user types will fix them
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::ReconciliationInvariant
        )
    }

    /// The input field at fault, for validation and stock errors
    pub fn field(&self) -> Option<&str> {
        match self {
            EngineError::Valuation(e) => e.field(),
            EngineError::Stock(e) => e.field(),
            EngineError::Settlement(e) => e.field(),
            EngineError::Validation { field, .. } => field.as_deref(),
            EngineError::Port(PortError::Validation { field, .. }) => field.as_deref(),
            _ => None,
        }
    }
}
