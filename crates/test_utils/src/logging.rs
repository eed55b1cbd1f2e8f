//! Tracing setup for tests

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test-friendly subscriber once per process
///
/// Honours `RUST_LOG`; defaults to `debug` for the engine crates so failing
/// tests show the pipeline's decisions.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,domain_valuation=debug,domain_stock=debug,domain_settlement=debug,domain_transaction=debug")
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
