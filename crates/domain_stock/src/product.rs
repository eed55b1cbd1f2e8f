//! Products as seen by the valuation engine
//!
//! Only the fields that matter for HAS valuation are modelled here. A
//! product is tracked one of three ways, and the track type decides whether
//! a sale goes through the lot tracker or the pool ledger.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{KaratId, ProductId, ProductTypeId};
use domain_valuation::validate_fineness;
use crate::error::StockError;
use crate::pool::PoolKey;

/// Decimal places kept for a lot's per-unit HAS value
pub const UNIT_HAS_PRECISION: u32 = 8;

/// How a product's stock is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackType {
    /// One-off piece, sold whole
    Unique,
    /// Discrete lot sold in partial quantities
    Fifo,
    /// Fungible bulk gold costed at moving average
    Pool,
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackType::Unique => write!(f, "UNIQUE"),
            TrackType::Fifo => write!(f, "FIFO"),
            TrackType::Pool => write!(f, "POOL"),
        }
    }
}

/// Unit a product's quantity is counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    Gram,
    Piece,
}

/// Per-unit HAS of a lot, truncated so that `unit_has * quantity` never
/// exceeds the lot's total value
pub fn unit_has(total_has: Decimal, quantity: Decimal) -> Result<Decimal, StockError> {
    if quantity <= Decimal::ZERO {
        return Err(StockError::non_positive("quantity", quantity));
    }
    Ok((total_has / quantity).round_dp_with_strategy(UNIT_HAS_PRECISION, RoundingStrategy::ToZero))
}

/// A sellable product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Product type (bracelet, ring, bar, ...)
    pub product_type_id: ProductTypeId,
    /// Karat, required for pool-tracked products
    pub karat_id: Option<KaratId>,
    /// Tracking mode
    pub track_type: TrackType,
    /// Counting unit
    pub unit: Unit,
    /// Total units produced
    pub quantity: Decimal,
    /// Units still sellable
    pub remaining_quantity: Decimal,
    /// Pure gold ratio
    pub fineness: Decimal,
    /// HAS value per unit, fixed at creation
    pub unit_has: Decimal,
    /// HAS value of the whole item
    pub sale_has_value: Decimal,
}

impl Product {
    /// Creates a one-off item sold whole
    pub fn unique(
        product_type_id: ProductTypeId,
        fineness: Decimal,
        sale_has_value: Decimal,
    ) -> Result<Self, StockError> {
        validate_fineness(fineness, "product")?;
        if sale_has_value <= Decimal::ZERO {
            return Err(StockError::non_positive("sale_has_value", sale_has_value));
        }

        Ok(Self {
            id: ProductId::new_v7(),
            product_type_id,
            karat_id: None,
            track_type: TrackType::Unique,
            unit: Unit::Piece,
            quantity: Decimal::ONE,
            remaining_quantity: Decimal::ONE,
            fineness,
            unit_has: sale_has_value,
            sale_has_value,
        })
    }

    /// Creates a lot sold in partial quantities
    pub fn fifo(
        product_type_id: ProductTypeId,
        unit: Unit,
        quantity: Decimal,
        fineness: Decimal,
        sale_has_value: Decimal,
    ) -> Result<Self, StockError> {
        validate_fineness(fineness, "product")?;
        if unit == Unit::Piece && !quantity.fract().is_zero() {
            return Err(StockError::FractionalPieceQuantity(quantity));
        }
        if sale_has_value <= Decimal::ZERO {
            return Err(StockError::non_positive("sale_has_value", sale_has_value));
        }
        let per_unit = unit_has(sale_has_value, quantity)?;

        Ok(Self {
            id: ProductId::new_v7(),
            product_type_id,
            karat_id: None,
            track_type: TrackType::Fifo,
            unit,
            quantity,
            remaining_quantity: quantity,
            fineness,
            unit_has: per_unit,
            sale_has_value,
        })
    }

    /// Creates a catalog entry for pool-tracked bulk gold
    pub fn pool(
        product_type_id: ProductTypeId,
        karat_id: KaratId,
        fineness: Decimal,
    ) -> Result<Self, StockError> {
        validate_fineness(fineness, "product")?;
        Ok(Self {
            id: ProductId::new_v7(),
            product_type_id,
            karat_id: Some(karat_id),
            track_type: TrackType::Pool,
            unit: Unit::Gram,
            quantity: Decimal::ZERO,
            remaining_quantity: Decimal::ZERO,
            fineness,
            unit_has: Decimal::ZERO,
            sale_has_value: Decimal::ZERO,
        })
    }

    /// Sets the identifier
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }

    /// Sets the karat
    pub fn with_karat(mut self, karat_id: KaratId) -> Self {
        self.karat_id = Some(karat_id);
        self
    }

    /// Sets units still sellable (e.g. when restoring persisted state)
    pub fn with_remaining(mut self, remaining_quantity: Decimal) -> Self {
        self.remaining_quantity = remaining_quantity;
        self
    }

    /// Pool bucket this product draws from, if pool-tracked
    pub fn pool_key(&self) -> Option<PoolKey> {
        match (self.track_type, self.karat_id) {
            (TrackType::Pool, Some(karat_id)) => Some(PoolKey::new(self.product_type_id, karat_id)),
            _ => None,
        }
    }

    /// True when at least some stock remains
    pub fn is_available(&self) -> bool {
        self.remaining_quantity > Decimal::ZERO
    }

    /// Checks `0 <= remaining_quantity <= quantity` for lot-tracked products
    pub fn validate(&self) -> Result<(), StockError> {
        validate_fineness(self.fineness, "product")?;
        if self.track_type == TrackType::Pool {
            if self.karat_id.is_none() {
                return Err(StockError::InvalidProduct(format!(
                    "pool product {} has no karat",
                    self.id
                )));
            }
            return Ok(());
        }
        if self.remaining_quantity < Decimal::ZERO || self.remaining_quantity > self.quantity {
            return Err(StockError::InvalidProduct(format!(
                "product {} has remaining quantity {} outside 0..={}",
                self.id, self.remaining_quantity, self.quantity
            )));
        }
        Ok(())
    }
}
