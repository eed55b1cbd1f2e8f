//! Stock Domain
//!
//! This crate tracks the two kinds of sellable gold stock and their cost:
//!
//! - **Pool**: fungible bulk gold keyed by (product type, karat), costed at a
//!   moving average of HAS per gram
//! - **Lot**: discrete products with a remaining quantity and a fixed HAS
//!   value per unit
//!
//! The two never share a code path. A product's [`TrackType`] decides which
//! one handles it.
//!
//! # Example
//!
//! ```rust
//! use core_kernel::{KaratId, ProductTypeId};
//! use domain_stock::{PoolKey, StockPoolBucket};
//! use rust_decimal_macros::dec;
//!
//! let bucket = StockPoolBucket::empty(PoolKey::new(ProductTypeId::new(), KaratId::new()));
//! let deposit = bucket.deposit(dec!(100), dec!(0.916), dec!(0.05)).unwrap();
//! assert_eq!(deposit.bucket.avg_cost_per_gram(), dec!(0.966));
//! ```

pub mod product;
pub mod pool;
pub mod lot;
pub mod error;

pub use product::{Product, TrackType, Unit, unit_has, UNIT_HAS_PRECISION};
pub use pool::{PoolKey, StockPoolBucket, PoolDeposit, PoolWithdrawal};
pub use lot::{sell, LotSale};
pub use error::StockError;
