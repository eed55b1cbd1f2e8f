//! HAS valuation
//!
//! Converts a physical item into fine-gold-equivalent grams and prices HAS
//! amounts against a snapshot. Everything here is a pure function of its
//! arguments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::Money;
use crate::error::ValuationError;
use crate::karat::validate_fineness;
use crate::price::{PriceSide, PriceSnapshot};

/// How labor is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaborType {
    /// HAS per gram of item weight
    PerGram,
    /// Flat HAS per piece, independent of weight
    PerPiece,
}

/// Labor (workmanship) charge expressed in HAS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labor {
    pub labor_type: LaborType,
    pub value: Decimal,
}

impl Labor {
    pub fn per_gram(value: Decimal) -> Self {
        Self { labor_type: LaborType::PerGram, value }
    }

    pub fn per_piece(value: Decimal) -> Self {
        Self { labor_type: LaborType::PerPiece, value }
    }

    pub fn none() -> Self {
        Self::per_gram(Decimal::ZERO)
    }

    /// Labor HAS for an item of the given weight
    pub fn has_for(&self, weight_gram: Decimal) -> Decimal {
        match self.labor_type {
            LaborType::PerGram => self.value * weight_gram,
            LaborType::PerPiece => self.value,
        }
    }
}

impl Default for Labor {
    fn default() -> Self {
        Self::none()
    }
}

/// Where an item's material value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialBasis {
    /// Gold item valued by weight and fineness
    Gold {
        weight_gram: Decimal,
        fineness: Decimal,
    },
    /// Non-gold item with a directly supplied purchase HAS
    NonGold {
        weight_gram: Decimal,
        purchase_has: Decimal,
    },
}

impl MaterialBasis {
    pub fn weight_gram(&self) -> Decimal {
        match self {
            MaterialBasis::Gold { weight_gram, .. } | MaterialBasis::NonGold { weight_gram, .. } => {
                *weight_gram
            }
        }
    }

    /// Fineness for gold items, `None` for non-gold
    pub fn fineness(&self) -> Option<Decimal> {
        match self {
            MaterialBasis::Gold { fineness, .. } => Some(*fineness),
            MaterialBasis::NonGold { .. } => None,
        }
    }
}

/// Breakdown of a HAS valuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasValuation {
    pub material_has: Decimal,
    pub labor_has: Decimal,
    pub total_has: Decimal,
}

/// Values a gold item: `weight * fineness` plus labor
///
/// # Errors
///
/// - `InvalidFineness` (configuration) when fineness is outside (0, 1]
/// - `NonPositive` when weight is zero or negative
/// - `Negative` when the labor value is negative
pub fn valuate(
    weight_gram: Decimal,
    fineness: Decimal,
    labor: &Labor,
) -> Result<HasValuation, ValuationError> {
    valuate_basis(&MaterialBasis::Gold { weight_gram, fineness }, labor)
}

/// Values an item from its material basis plus labor
pub fn valuate_basis(basis: &MaterialBasis, labor: &Labor) -> Result<HasValuation, ValuationError> {
    if labor.value < Decimal::ZERO {
        return Err(ValuationError::negative("labor", labor.value));
    }

    let (material_has, weight_gram) = match *basis {
        MaterialBasis::Gold { weight_gram, fineness } => {
            validate_fineness(fineness, "item")?;
            if weight_gram <= Decimal::ZERO {
                return Err(ValuationError::non_positive("weight_gram", weight_gram));
            }
            (weight_gram * fineness, weight_gram)
        }
        MaterialBasis::NonGold { weight_gram, purchase_has } => {
            if weight_gram < Decimal::ZERO {
                return Err(ValuationError::negative("weight_gram", weight_gram));
            }
            if purchase_has < Decimal::ZERO {
                return Err(ValuationError::negative("purchase_has", purchase_has));
            }
            (purchase_has, weight_gram)
        }
    };

    let labor_has = labor.has_for(weight_gram);
    let valuation = HasValuation {
        material_has,
        labor_has,
        total_has: material_has + labor_has,
    };

    debug!(
        material_has = %valuation.material_has,
        labor_has = %valuation.labor_has,
        "Valuated item"
    );

    Ok(valuation)
}

/// Prices a HAS amount in the snapshot's base currency
pub fn has_to_currency(has_amount: Decimal, snapshot: &PriceSnapshot, side: PriceSide) -> Money {
    Money::new(has_amount * snapshot.has_price(side), snapshot.base_currency)
}

/// Converts a base-currency amount into HAS grams, kept to `HAS_CALC_PRECISION` places
///
/// # Errors
///
/// `InvalidSnapshot` when the gold price on that side is not positive.
pub fn currency_to_has(
    base_amount: Decimal,
    snapshot: &PriceSnapshot,
    side: PriceSide,
) -> Result<Decimal, ValuationError> {
    let price = snapshot.has_price(side);
    if price <= Decimal::ZERO {
        return Err(ValuationError::InvalidSnapshot(format!(
            "HAS {} price must be positive, got {}",
            side, price
        )));
    }
    Ok((base_amount / price).round_dp_with_strategy(
        crate::HAS_CALC_PRECISION,
        rust_decimal::RoundingStrategy::MidpointAwayFromZero,
    ))
}
