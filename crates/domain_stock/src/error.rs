//! Stock domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::ProductId;
use domain_valuation::ValuationError;
use crate::product::TrackType;

/// Errors that can occur when moving stock
#[derive(Debug, Error)]
pub enum StockError {
    /// A withdrawal would drive stock negative
    #[error("Insufficient stock for {field}: requested {requested}, available {available}, short by {shortfall}")]
    InsufficientStock {
        field: String,
        requested: Decimal,
        available: Decimal,
        shortfall: Decimal,
    },

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

    /// Piece-counted products sell in whole units
    #[error("Quantity {0} must be a whole number for piece-counted products")]
    FractionalPieceQuantity(Decimal),

    /// The product's track type does not support this operation
    #[error("Product {product_id} is {track_type}-tracked and cannot be used for {operation}")]
    WrongTrackType {
        product_id: ProductId,
        track_type: TrackType,
        operation: String,
    },

    /// Product state breaks an invariant
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Valuation failed (e.g. bad fineness)
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

impl StockError {
    pub fn insufficient(field: impl Into<String>, requested: Decimal, available: Decimal) -> Self {
        StockError::InsufficientStock {
            field: field.into(),
            requested,
            available,
            shortfall: requested - available,
        }
    }

    pub fn non_positive(field: impl Into<String>, value: Decimal) -> Self {
        StockError::NonPositive {
            field: field.into(),
            value,
        }
    }

    pub fn negative(field: impl Into<String>, value: Decimal) -> Self {
        StockError::Negative {
            field: field.into(),
            value,
        }
    }

    /// Shortfall amount for insufficient-stock errors
    pub fn shortfall(&self) -> Option<Decimal> {
        match self {
            StockError::InsufficientStock { shortfall, .. } => Some(*shortfall),
            _ => None,
        }
    }

    /// The input field the caller should re-prompt for, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            StockError::InsufficientStock { field, .. }
            | StockError::NonPositive { field, .. }
            | StockError::Negative { field, .. } => Some(field),
            StockError::FractionalPieceQuantity(_) => Some("quantity"),
            StockError::WrongTrackType { .. } => Some("product"),
            StockError::Valuation(e) => e.field(),
            StockError::InvalidProduct(_) => None,
        }
    }
}
