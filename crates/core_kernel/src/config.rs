//! Engine configuration
//!
//! Settings are read from `ENGINE_*` environment variables (a `.env` file is
//! honoured for local development). Every field has a default so an empty
//! environment yields a working engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::error::CoreError;
use crate::money::Currency;

/// Configuration for the valuation and reconciliation engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Currency all gold prices are quoted in
    pub base_currency: Currency,
    /// Differences smaller than this (in currency units) count as settled
    pub currency_tolerance: Decimal,
    /// Cap on the currency tolerance once converted to HAS grams
    pub has_tolerance: Decimal,
    /// Reject price snapshots older than this many seconds
    pub max_snapshot_age_secs: Option<u64>,
    /// Log level
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_currency: Currency::TRY,
            currency_tolerance: dec!(0.01),
            has_tolerance: dec!(0.001),
            max_snapshot_age_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the environment
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();

        let config: EngineConfig = config::Config::builder()
            .add_source(config::Environment::with_prefix("ENGINE"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that tolerances are usable
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.currency_tolerance < Decimal::ZERO {
            return Err(CoreError::configuration(format!(
                "currency_tolerance must not be negative, got {}",
                self.currency_tolerance
            )));
        }
        if self.has_tolerance < Decimal::ZERO {
            return Err(CoreError::configuration(format!(
                "has_tolerance must not be negative, got {}",
                self.has_tolerance
            )));
        }
        Ok(())
    }

    /// Maximum snapshot age as a chrono duration
    pub fn max_snapshot_age(&self) -> Option<chrono::Duration> {
        self.max_snapshot_age_secs
            .map(|secs| chrono::Duration::seconds(secs as i64))
    }
}
