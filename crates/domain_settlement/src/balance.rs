//! Party balance effects
//!
//! A party's HAS balance is signed: positive means the shop owes the party,
//! negative means the party owes the shop. A residual left by a partial
//! settlement moves that balance in the direction set by who was paying.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::PartyId;
use crate::error::SettlementError;
use crate::resolver::Resolution;

/// Which side of the counter was handing over value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayerRole {
    /// Purchases, payments out, scrap intake
    Shop,
    /// Sales and receipts
    Party,
}

impl PayerRole {
    /// Multiplier turning an unpaid residual into a balance change
    pub fn sign(&self) -> Decimal {
        match self {
            PayerRole::Shop => Decimal::ONE,
            PayerRole::Party => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Whether a transaction creates a new obligation or pays down an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Obligation {
    /// Goods change hands; only the unpaid part reaches the balance
    New,
    /// Cash or gold is paid against what is already on the balance
    Existing,
}

/// Change to one party's HAS balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub party_id: PartyId,
    pub has_delta: Decimal,
}

impl BalanceDelta {
    /// Delta for a settlement residual
    ///
    /// The shop underpaying leaves it owing the party (positive); the party
    /// underpaying leaves it owing the shop (negative). Overpayment flips both.
    pub fn from_residual(party_id: PartyId, payer: PayerRole, residual: Decimal) -> Self {
        Self {
            party_id,
            has_delta: payer.sign() * residual,
        }
    }

    /// Delta for a resolved settlement
    ///
    /// For a new obligation the balance moves by the residual only. Paying
    /// down an existing obligation moves it by everything that was settled,
    /// which is the expected amount less whatever stays carried.
    pub fn from_resolution(
        party_id: PartyId,
        payer: PayerRole,
        resolution: &Resolution,
        obligation: Obligation,
    ) -> Self {
        match obligation {
            Obligation::New => Self::from_residual(party_id, payer, resolution.debt_or_credit),
            Obligation::Existing => Self {
                party_id,
                has_delta: -payer.sign() * (resolution.expected - resolution.debt_or_credit),
            },
        }
    }

    pub fn is_zero(&self) -> bool {
        self.has_delta.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyBalance {
    pub party_id: PartyId,
    pub has_gold_balance: Decimal,
}

impl PartyBalance {
    pub fn new(party_id: PartyId, has_gold_balance: Decimal) -> Self {
        Self { party_id, has_gold_balance }
    }

    pub fn zero(party_id: PartyId) -> Self {
        Self::new(party_id, Decimal::ZERO)
    }

    /// Returns the balance after `delta`
    pub fn apply(&self, delta: &BalanceDelta) -> Result<PartyBalance, SettlementError> {
        if delta.party_id != self.party_id {
            return Err(SettlementError::PartyMismatch {
                balance: self.party_id,
                delta: delta.party_id,
            });
        }
        Ok(Self::new(self.party_id, self.has_gold_balance + delta.has_delta))
    }

    pub fn shop_owes_party(&self) -> bool {
        self.has_gold_balance > Decimal::ZERO
    }

    pub fn party_owes_shop(&self) -> bool {
        self.has_gold_balance < Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_party_underpays_sale() {
        let party = PartyId::new();
        let delta = BalanceDelta::from_residual(party, PayerRole::Party, dec!(150));
        let after = PartyBalance::zero(party).apply(&delta).unwrap();
        assert_eq!(after.has_gold_balance, dec!(-150));
        assert!(after.party_owes_shop());
    }

    #[test]
    fn test_shop_underpays_purchase() {
        let party = PartyId::new();
        let delta = BalanceDelta::from_residual(party, PayerRole::Shop, dec!(12.5));
        let after = PartyBalance::new(party, dec!(-2.5)).apply(&delta).unwrap();
        assert_eq!(after.has_gold_balance, dec!(10));
        assert!(after.shop_owes_party());
    }

    #[test]
    fn test_receipt_pays_down_party_debt() {
        use crate::resolver::{SettlementRequest, SettlementResolver};

        let party = PartyId::new();
        let r = SettlementResolver::new(dec!(0.001))
            .unwrap()
            .resolve(dec!(20), dec!(15), &SettlementRequest::debt_or_credit())
            .unwrap();
        let delta = BalanceDelta::from_resolution(party, PayerRole::Party, &r, Obligation::Existing);
        let after = PartyBalance::new(party, dec!(-20)).apply(&delta).unwrap();
        assert_eq!(after.has_gold_balance, dec!(-5));
    }

    #[test]
    fn test_delta_for_other_party_rejected() {
        let delta = BalanceDelta::from_residual(PartyId::new(), PayerRole::Shop, dec!(1));
        assert!(PartyBalance::zero(PartyId::new()).apply(&delta).is_err());
    }
}
