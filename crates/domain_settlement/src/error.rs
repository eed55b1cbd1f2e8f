//! Settlement domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PartyId;
use domain_valuation::ValuationError;

/// Errors that can occur while settling a transaction
#[derive(Debug, Error)]
pub enum SettlementError {
    /// An amount that must not be negative was
    #[error("Invalid {field}: {value} must not be negative")]
    NegativeAmount {
        field: String,
        value: Decimal,
    },

    /// A full-credit sale was submitted with money collected
    #[error("Full credit settlement cannot include a payment, got {0}")]
    CreditWithPayment(Decimal),

    /// Tolerance must not be negative
    #[error("Invalid settlement tolerance {0}")]
    InvalidTolerance(Decimal),

    /// A balance delta was applied to another party's balance
    #[error("Balance delta for party {delta} applied to balance of party {balance}")]
    PartyMismatch {
        balance: PartyId,
        delta: PartyId,
    },

    /// Converting a payment leg failed
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

impl SettlementError {
    pub fn negative(field: impl Into<String>, value: Decimal) -> Self {
        SettlementError::NegativeAmount {
            field: field.into(),
            value,
        }
    }

    /// True for problems with reference data or setup rather than input
    pub fn is_configuration(&self) -> bool {
        match self {
            SettlementError::InvalidTolerance(_) => true,
            SettlementError::Valuation(e) => e.is_configuration(),
            _ => false,
        }
    }

    /// The input field the caller should re-prompt for, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            SettlementError::NegativeAmount { field, .. } => Some(field),
            SettlementError::CreditWithPayment(_) => Some("payment"),
            SettlementError::Valuation(e) => e.field(),
            SettlementError::PartyMismatch { .. } => Some("party_id"),
            SettlementError::InvalidTolerance(_) => None,
        }
    }
}
