//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! valuation and reconciliation test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built reference data (karats, snapshots, stock)
//! - `builders`: Builder patterns for snapshots and lots
//! - `in_memory`: In-memory collaborator ports and a wired-up service
//! - `assertions`: Custom assertion helpers for engine results
//! - `generators`: Property-based test data generators
//! - `logging`: Tracing subscriber for test output

pub mod fixtures;
pub mod builders;
pub mod in_memory;
pub mod assertions;
pub mod generators;
pub mod logging;

pub use fixtures::*;
pub use builders::*;
pub use in_memory::*;
pub use assertions::*;
pub use generators::*;
pub use logging::init_test_tracing;
