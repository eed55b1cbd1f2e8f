//! Settlement Domain
//!
//! Decides what happens when the money or gold that changed hands does not
//! match what a transaction called for.
//!
//! - [`payment`]: cash and gold payment legs converted to HAS
//! - [`resolver`]: expected vs actual under a caller-selected policy
//! - [`balance`]: signed party balance deltas for carried residuals
//!
//! # Example
//!
//! ```rust
//! use domain_settlement::{SettlementOutcome, SettlementRequest, SettlementResolver};
//! use rust_decimal_macros::dec;
//!
//! let resolver = SettlementResolver::new(dec!(0.01)).unwrap();
//! let r = resolver.resolve(dec!(1000), dec!(850), &SettlementRequest::discount()).unwrap();
//! assert_eq!(r.outcome, SettlementOutcome::Discounted);
//! assert_eq!(r.discount, dec!(150));
//! ```

pub mod resolver;
pub mod payment;
pub mod balance;
pub mod error;

pub use resolver::{
    Imbalance, Resolution, SettlementOutcome, SettlementPolicy, SettlementRequest,
    SettlementResolver,
};
pub use payment::{collect, CollectedPayment, GoldLeg, Payment};
pub use balance::{BalanceDelta, Obligation, PartyBalance, PayerRole};
pub use error::SettlementError;
