//! Lot quantity tracking
//!
//! FIFO lots are sold in partial quantities at a per-unit HAS value fixed
//! when the lot was created. Unique items are sold whole.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::ProductId;
use crate::error::StockError;
use crate::product::{Product, TrackType, Unit};

/// Result of selling from a lot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSale {
    pub product_id: ProductId,
    pub quantity_sold: Decimal,
    pub line_has: Decimal,
    pub remaining_quantity: Decimal,
    /// Product state after the sale
    pub product: Product,
}

/// Sells `requested_quantity` units of a lot-tracked product
///
/// Unique products ignore the requested quantity and are consumed whole.
///
/// # Errors
///
/// - `NonPositive` when the quantity is zero or negative
/// - `FractionalPieceQuantity` for a non-integer quantity of a piece product
/// - `InsufficientStock` when the quantity exceeds what remains
/// - `WrongTrackType` for pool-tracked products
pub fn sell(product: &Product, requested_quantity: Decimal) -> Result<LotSale, StockError> {
    match product.track_type {
        TrackType::Pool => Err(StockError::WrongTrackType {
            product_id: product.id,
            track_type: product.track_type,
            operation: "lot sale".to_string(),
        }),
        TrackType::Unique => sell_unique(product),
        TrackType::Fifo => sell_fifo(product, requested_quantity),
    }
}

fn sell_unique(product: &Product) -> Result<LotSale, StockError> {
    if !product.is_available() {
        return Err(StockError::insufficient("quantity", Decimal::ONE, Decimal::ZERO));
    }

    let mut sold = product.clone();
    sold.remaining_quantity = Decimal::ZERO;

    debug!(product_id = %product.id, has = %product.sale_has_value, "Unique item sold");

    Ok(LotSale {
        product_id: product.id,
        quantity_sold: product.quantity,
        line_has: product.sale_has_value,
        remaining_quantity: Decimal::ZERO,
        product: sold,
    })
}

fn sell_fifo(product: &Product, requested_quantity: Decimal) -> Result<LotSale, StockError> {
    if requested_quantity <= Decimal::ZERO {
        return Err(StockError::non_positive("quantity", requested_quantity));
    }
    if product.unit == Unit::Piece && !requested_quantity.fract().is_zero() {
        return Err(StockError::FractionalPieceQuantity(requested_quantity));
    }
    if requested_quantity > product.remaining_quantity {
        return Err(StockError::insufficient(
            "quantity",
            requested_quantity,
            product.remaining_quantity,
        ));
    }

    let line_has = product.unit_has * requested_quantity;
    let mut sold = product.clone();
    sold.remaining_quantity = product.remaining_quantity - requested_quantity;

    debug!(
        product_id = %product.id,
        quantity = %requested_quantity,
        remaining = %sold.remaining_quantity,
        "Lot units sold"
    );

    Ok(LotSale {
        product_id: product.id,
        quantity_sold: requested_quantity,
        line_has,
        remaining_quantity: sold.remaining_quantity,
        product: sold,
    })
}
