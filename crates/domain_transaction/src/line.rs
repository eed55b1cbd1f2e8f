//! Valued transaction lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{KaratId, ProductId, ProductTypeId};
use domain_stock::TrackType;

/// What a line does to stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineKind {
    /// Bulk gold bought into a pool
    PoolPurchase,
    /// Bulk gold sold out of a pool
    PoolSale,
    /// Units sold from a lot or a unique item
    LotSale,
    /// Discrete item bought in as a new lot
    ItemPurchase,
    /// Scrap gold bought for melting
    Scrap,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineKind::PoolPurchase => "POOL_PURCHASE",
            LineKind::PoolSale => "POOL_SALE",
            LineKind::LotSale => "LOT_SALE",
            LineKind::ItemPurchase => "ITEM_PURCHASE",
            LineKind::Scrap => "SCRAP",
        };
        f.write_str(name)
    }
}

/// Whether gold enters or leaves the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn sign(&self) -> Decimal {
        match self {
            Direction::Incoming => Decimal::ONE,
            Direction::Outgoing => Decimal::NEGATIVE_ONE,
        }
    }
}

impl LineKind {
    pub fn direction(&self) -> Direction {
        match self {
            LineKind::PoolPurchase | LineKind::ItemPurchase | LineKind::Scrap => Direction::Incoming,
            LineKind::PoolSale | LineKind::LotSale => Direction::Outgoing,
        }
    }
}

/// A line as written to the persisted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub kind: LineKind,
    pub direction: Direction,
    pub product_id: Option<ProductId>,
    pub product_type_id: Option<ProductTypeId>,
    pub karat_id: Option<KaratId>,
    /// Track type of a purchased item, for creating its lot
    pub track_type: Option<TrackType>,
    pub weight_gram: Decimal,
    pub quantity: Decimal,
    /// Zero for non-gold items
    pub fineness: Decimal,
    pub material_has: Decimal,
    pub labor_has_value: Decimal,
    /// Unsigned HAS value of the line
    pub line_total_has: Decimal,
    /// Per-unit HAS of a purchased lot
    pub unit_has: Option<Decimal>,
    /// Cost of goods sold, for pool sales
    pub cost_of_goods_has: Option<Decimal>,
    /// Sale value less cost of goods, for pool sales
    pub profit_has: Option<Decimal>,
}

impl TransactionLine {
    /// Line value signed by direction: incoming positive, outgoing negative
    pub fn signed_has(&self) -> Decimal {
        self.direction.sign() * self.line_total_has
    }
}
