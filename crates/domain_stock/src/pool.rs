//! Stock pool ledger
//!
//! Bulk gold of the same product type and karat is fungible, so it is costed
//! at a moving average. A bucket stores only running totals; the average is
//! always derived from them, never re-averaged from two averages.
//!
//! Operations take the current bucket by reference and return the new bucket
//! alongside the result. Nothing is mutated in place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use core_kernel::{KaratId, ProductTypeId};
use domain_valuation::{valuate, Labor};
use crate::error::StockError;

/// Identifies a pool bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub product_type_id: ProductTypeId,
    pub karat_id: KaratId,
}

impl PoolKey {
    pub fn new(product_type_id: ProductTypeId, karat_id: KaratId) -> Self {
        Self { product_type_id, karat_id }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_type_id, self.karat_id)
    }
}

/// Running totals for one (product type, karat) pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPoolBucket {
    pub key: PoolKey,
    pub total_weight_gram: Decimal,
    pub total_cost_has: Decimal,
}

/// Result of adding gold to a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDeposit {
    pub weight_gram: Decimal,
    pub material_has: Decimal,
    pub labor_has: Decimal,
    pub added_cost_has: Decimal,
    /// Bucket state after the deposit
    pub bucket: StockPoolBucket,
}

/// Result of taking gold out of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolWithdrawal {
    pub weight_gram: Decimal,
    /// Average cost per gram before the withdrawal
    pub avg_cost_per_gram: Decimal,
    pub cost_of_goods_has: Decimal,
    /// Sale value: `weight * fineness + weight * labor_per_gram`
    pub sale_has: Decimal,
    pub profit_has: Decimal,
    /// Bucket state after the withdrawal
    pub bucket: StockPoolBucket,
}

impl StockPoolBucket {
    /// An empty bucket
    pub fn empty(key: PoolKey) -> Self {
        Self {
            key,
            total_weight_gram: Decimal::ZERO,
            total_cost_has: Decimal::ZERO,
        }
    }

    /// Restores a bucket from persisted totals
    pub fn new(key: PoolKey, total_weight_gram: Decimal, total_cost_has: Decimal) -> Result<Self, StockError> {
        if total_weight_gram < Decimal::ZERO {
            return Err(StockError::negative("total_weight_gram", total_weight_gram));
        }
        if total_cost_has < Decimal::ZERO {
            return Err(StockError::negative("total_cost_has", total_cost_has));
        }
        Ok(Self { key, total_weight_gram, total_cost_has })
    }

    /// Moving-average cost per gram; zero for an empty bucket
    pub fn avg_cost_per_gram(&self) -> Decimal {
        if self.total_weight_gram.is_zero() {
            return Decimal::ZERO;
        }
        self.total_cost_has / self.total_weight_gram
    }

    pub fn is_empty(&self) -> bool {
        self.total_weight_gram.is_zero()
    }

    /// Adds purchased gold at its full HAS cost
    ///
    /// # Arguments
    ///
    /// * `weight_gram` - Weight bought, must be positive
    /// * `fineness` - Fineness of the karat, in (0, 1]
    /// * `labor_per_gram` - Labor HAS paid per gram, not negative
    pub fn deposit(
        &self,
        weight_gram: Decimal,
        fineness: Decimal,
        labor_per_gram: Decimal,
    ) -> Result<PoolDeposit, StockError> {
        let valuation = valuate(weight_gram, fineness, &Labor::per_gram(labor_per_gram))?;

        let bucket = StockPoolBucket {
            key: self.key,
            total_weight_gram: self.total_weight_gram + weight_gram,
            total_cost_has: self.total_cost_has + valuation.total_has,
        };

        debug!(
            pool = %self.key,
            weight = %weight_gram,
            added_cost = %valuation.total_has,
            "Pool deposit"
        );

        Ok(PoolDeposit {
            weight_gram,
            material_has: valuation.material_has,
            labor_has: valuation.labor_has,
            added_cost_has: valuation.total_has,
            bucket,
        })
    }

    /// Removes sold gold at the current average cost
    ///
    /// Cost leaves the pool at the average rate, so the average of what
    /// remains is unchanged. Draining the pool completely removes the whole
    /// remaining cost.
    ///
    /// # Errors
    ///
    /// `InsufficientStock` when `weight_gram` exceeds the pool weight.
    pub fn withdraw(
        &self,
        weight_gram: Decimal,
        fineness: Decimal,
        labor_per_gram: Decimal,
    ) -> Result<PoolWithdrawal, StockError> {
        let sale = valuate(weight_gram, fineness, &Labor::per_gram(labor_per_gram))?;

        if weight_gram > self.total_weight_gram {
            return Err(StockError::insufficient("weight_gram", weight_gram, self.total_weight_gram));
        }

        let avg_cost_per_gram = self.avg_cost_per_gram();
        let cost_of_goods_has = if weight_gram == self.total_weight_gram {
            self.total_cost_has
        } else {
            weight_gram * avg_cost_per_gram
        };

        let bucket = StockPoolBucket {
            key: self.key,
            total_weight_gram: self.total_weight_gram - weight_gram,
            total_cost_has: self.total_cost_has - cost_of_goods_has,
        };

        debug!(
            pool = %self.key,
            weight = %weight_gram,
            cost_of_goods = %cost_of_goods_has,
            "Pool withdrawal"
        );

        Ok(PoolWithdrawal {
            weight_gram,
            avg_cost_per_gram,
            cost_of_goods_has,
            sale_has: sale.total_has,
            profit_has: sale.total_has - cost_of_goods_has,
            bucket,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn key() -> PoolKey {
        PoolKey::new(ProductTypeId::new(), KaratId::new())
    }

    #[test]
    fn test_empty_bucket_average_is_zero() {
        assert_eq!(StockPoolBucket::empty(key()).avg_cost_per_gram(), Decimal::ZERO);
    }

    #[test]
    fn test_deposit_into_empty_bucket() {
        let deposit = StockPoolBucket::empty(key())
            .deposit(dec!(100), dec!(0.916), dec!(0.05))
            .unwrap();

        assert_eq!(deposit.material_has, dec!(91.6));
        assert_eq!(deposit.labor_has, dec!(5.0));
        assert_eq!(deposit.bucket.total_cost_has, dec!(96.6));
        assert_eq!(deposit.bucket.avg_cost_per_gram(), dec!(0.966));
    }

    #[test]
    fn test_withdraw_more_than_pool_holds() {
        let bucket = StockPoolBucket::new(key(), dec!(10), dec!(9.5)).unwrap();
        let err = bucket.withdraw(dec!(12.5), dec!(0.916), Decimal::ZERO).unwrap_err();
        assert_eq!(err.shortfall(), Some(dec!(2.5)));
    }

    #[test]
    fn test_draining_removes_all_cost() {
        let bucket = StockPoolBucket::new(key(), dec!(3), dec!(2)).unwrap();
        let w = bucket.withdraw(dec!(3), dec!(0.916), Decimal::ZERO).unwrap();
        assert!(w.bucket.is_empty());
        assert_eq!(w.bucket.total_cost_has, Decimal::ZERO);
    }

    #[test]
    fn test_negative_totals_rejected() {
        assert!(StockPoolBucket::new(key(), dec!(-1), dec!(0)).is_err());
    }
}
