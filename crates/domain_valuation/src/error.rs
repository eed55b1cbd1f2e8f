//! Valuation domain errors

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::Currency;
use crate::price::PriceSide;

/// Errors that can occur while valuing gold or converting currency
#[derive(Debug, Error)]
pub enum ValuationError {
    /// Fineness outside (0, 1]; reference data is broken
    #[error("Invalid fineness {fineness} for {context}: must be greater than 0 and at most 1")]
    InvalidFineness {
        fineness: Decimal,
        context: String,
    },

    /// Two karats share a label
    #[error("Duplicate karat label: {0}")]
    DuplicateKarat(String),

    /// No price snapshot is available
    #[error("No price snapshot available")]
    MissingSnapshot,

    /// Snapshot has unusable prices
    #[error("Invalid price snapshot: {0}")]
    InvalidSnapshot(String),

    /// Snapshot is older than the configured maximum age
    #[error("Price snapshot taken at {taken_at} is older than {max_age_secs}s")]
    StaleSnapshot {
        taken_at: DateTime<Utc>,
        max_age_secs: i64,
    },

    /// Snapshot carries no rate for a foreign currency in use
    #[error("No {side} rate for {currency} in price snapshot")]
    MissingRate {
        currency: Currency,
        side: PriceSide,
    },

    /// A caller-supplied exchange rate was zero or negative
    #[error("Invalid exchange rate {0}: must be positive")]
    InvalidRate(Decimal),

    /// A quantity that must be positive was not
    #[error("Invalid {field}: {value} must be positive")]
    NonPositive {
        field: String,
        value: Decimal,
    },

    /// A quantity that must not be negative was
    #[error("Invalid {field}: {value} must not be negative")]
    Negative {
        field: String,
        value: Decimal,
    },

    /// Karat selection does not resolve against the karat table
    #[error("Unknown karat: {0}")]
    UnknownKarat(String),
}

impl ValuationError {
    pub fn non_positive(field: impl Into<String>, value: Decimal) -> Self {
        ValuationError::NonPositive {
            field: field.into(),
            value,
        }
    }

    pub fn negative(field: impl Into<String>, value: Decimal) -> Self {
        ValuationError::Negative {
            field: field.into(),
            value,
        }
    }

    /// True for broken reference data or missing prices, as opposed to bad user input
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ValuationError::InvalidFineness { .. }
                | ValuationError::DuplicateKarat(_)
                | ValuationError::MissingSnapshot
                | ValuationError::InvalidSnapshot(_)
                | ValuationError::StaleSnapshot { .. }
                | ValuationError::MissingRate { .. }
        )
    }

    /// The input field the caller should re-prompt for, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            ValuationError::NonPositive { field, .. } | ValuationError::Negative { field, .. } => {
                Some(field)
            }
            ValuationError::InvalidRate(_) => Some("exchange_rate"),
            ValuationError::UnknownKarat(_) => Some("karat"),
            _ => None,
        }
    }
}
