//! Karat reference data
//!
//! A karat maps a label such as "22K" to the fraction of pure gold in the
//! alloy. Every valuation reads fineness from here, so a bad entry is a
//! configuration problem rather than a user mistake.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use core_kernel::KaratId;
use crate::error::ValuationError;

/// Checks that a fineness lies in (0, 1]
pub fn validate_fineness(fineness: Decimal, context: &str) -> Result<Decimal, ValuationError> {
    if fineness <= Decimal::ZERO || fineness > Decimal::ONE {
        return Err(ValuationError::InvalidFineness {
            fineness,
            context: context.to_string(),
        });
    }
    Ok(fineness)
}

/// A karat grade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Karat {
    /// Unique identifier
    pub id: KaratId,
    /// Display label (e.g. "22K")
    pub label: String,
    /// Pure gold ratio
    pub fineness: Decimal,
}

impl Karat {
    /// Creates a karat with a fresh identifier
    pub fn new(label: impl Into<String>, fineness: Decimal) -> Result<Self, ValuationError> {
        Self::with_id(KaratId::new(), label, fineness)
    }

    /// Creates a karat with a known identifier
    pub fn with_id(
        id: KaratId,
        label: impl Into<String>,
        fineness: Decimal,
    ) -> Result<Self, ValuationError> {
        let label = label.into();
        validate_fineness(fineness, &label)?;
        Ok(Self { id, label, fineness })
    }

    /// Fineness expressed in thousandths (milyem)
    pub fn millesimal(&self) -> Decimal {
        self.fineness * dec!(1000)
    }
}

/// Lookup table of karats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KaratTable {
    karats: Vec<Karat>,
}

impl KaratTable {
    /// Builds a table, rejecting invalid fineness and duplicate labels
    pub fn new(karats: Vec<Karat>) -> Result<Self, ValuationError> {
        let mut labels = HashSet::new();
        for karat in &karats {
            validate_fineness(karat.fineness, &karat.label)?;
            if !labels.insert(karat.label.to_ascii_uppercase()) {
                return Err(ValuationError::DuplicateKarat(karat.label.clone()));
            }
        }
        Ok(Self { karats })
    }

    /// The karats stocked by a typical shop
    pub fn standard() -> Self {
        let grades = [
            (24, dec!(0.995)),
            (22, dec!(0.916)),
            (21, dec!(0.875)),
            (18, dec!(0.750)),
            (14, dec!(0.585)),
            (8, dec!(0.333)),
        ];

        // Ids are derived from the karat number so every caller agrees on them
        Self {
            karats: grades
                .into_iter()
                .map(|(karat, fineness)| Karat {
                    id: KaratId::from_u128(karat),
                    label: format!("{}K", karat),
                    fineness,
                })
                .collect(),
        }
    }

    /// Looks up a karat by id
    pub fn get(&self, id: KaratId) -> Result<&Karat, ValuationError> {
        self.karats
            .iter()
            .find(|k| k.id == id)
            .ok_or_else(|| ValuationError::UnknownKarat(id.to_string()))
    }

    /// Looks up a karat by label, ignoring case
    pub fn by_label(&self, label: &str) -> Result<&Karat, ValuationError> {
        self.karats
            .iter()
            .find(|k| k.label.eq_ignore_ascii_case(label))
            .ok_or_else(|| ValuationError::UnknownKarat(label.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Karat> {
        self.karats.iter()
    }

    pub fn len(&self) -> usize {
        self.karats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.karats.is_empty()
    }
}
