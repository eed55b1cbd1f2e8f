//! Tests for kernel errors

use core_kernel::{CoreError, Currency, MoneyError};

#[test]
fn test_validation_message() {
    let error = CoreError::validation("weight must be positive");
    assert_eq!(error.to_string(), "Invalid input: weight must be positive");
    assert!(!error.is_configuration());
}

#[test]
fn test_configuration_error() {
    let error = CoreError::configuration("has_tolerance must not be negative");
    assert!(error.is_configuration());
    assert!(error.to_string().starts_with("Configuration error"));
}

#[test]
fn test_money_error_is_passed_through() {
    let core_error: CoreError = MoneyError::CurrencyMismatch {
        left: Currency::TRY,
        right: Currency::EUR,
    }
    .into();

    assert!(matches!(core_error, CoreError::Money(_)));
    assert_eq!(core_error.to_string(), "Cannot combine TRY with EUR");
}
