//! Kernel errors

use thiserror::Error;
use crate::money::MoneyError;

/// Errors raised by the kernel itself
///
/// Domain crates wrap this in their own error enums; a `Configuration`
/// error stops the engine from starting or processing at all.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, CoreError::Configuration(_))
    }
}
