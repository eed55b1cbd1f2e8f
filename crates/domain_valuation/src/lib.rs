//! Valuation Domain
//!
//! This crate turns physical gold and cash into the shop's common unit of
//! account, the HAS gram (one gram of fine gold).
//!
//! # Key Concepts
//!
//! - **Karat**: label to fineness lookup (22K = 0.916)
//! - **Price Snapshot**: gold buy/sell price and foreign currency rates
//! - **HAS Valuation**: `weight * fineness + labor`
//! - **Currency Conversion**: base ↔ foreign at a snapshot rate
//!
//! # Precision
//!
//! All values are exact decimals. HAS amounts are shown to three decimal
//! places (milligram resolution) via [`round_has`]. Money converted to HAS
//! is carried at [`HAS_CALC_PRECISION`] places so that sums and differences
//! of converted amounts stay exact; nothing else rounds on its own.

pub mod karat;
pub mod price;
pub mod valuator;
pub mod currency;
pub mod error;

pub use karat::{Karat, KaratTable, validate_fineness};
pub use price::{PriceSide, PriceSnapshot, Quote};
pub use valuator::{
    valuate, valuate_basis, has_to_currency, currency_to_has,
    HasValuation, Labor, LaborType, MaterialBasis,
};
pub use currency::{to_base, to_foreign, convert_to_base, convert_from_base, BaseConversion};
pub use error::ValuationError;

use rust_decimal::Decimal;

/// Display precision for HAS grams (milligrams)
pub const HAS_PRECISION: u32 = 3;

/// Places kept when money is converted to HAS
pub const HAS_CALC_PRECISION: u32 = 10;

/// Rounds a HAS amount for display
pub fn round_has(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(HAS_PRECISION, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}
