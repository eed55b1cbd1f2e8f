//! Transaction types and their pricing rules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use domain_settlement::{Obligation, PayerRole};
use domain_valuation::PriceSide;

use crate::error::EngineError;
use crate::line::LineKind;

/// The six kinds of financial transaction the shop records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Shop buys gold or items from a party
    Purchase,
    /// Shop sells gold or items to a party
    Sale,
    /// Shop pays a party against what it owes
    Payment,
    /// Shop collects from a party against what the party owes
    Receipt,
    /// Shop buys or sells foreign currency
    Exchange,
    /// Shop buys scrap gold
    Hurda,
}

impl TransactionType {
    pub const ALL: [TransactionType; 6] = [
        TransactionType::Purchase,
        TransactionType::Sale,
        TransactionType::Payment,
        TransactionType::Receipt,
        TransactionType::Exchange,
        TransactionType::Hurda,
    ];

    /// Persisted type code
    pub fn code(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "PURCHASE",
            TransactionType::Sale => "SALE",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Receipt => "RECEIPT",
            TransactionType::Exchange => "EXCHANGE",
            TransactionType::Hurda => "HURDA",
        }
    }

    /// Gold price side used to turn HAS into money and back
    ///
    /// `None` for EXCHANGE, which never touches gold.
    pub fn gold_price_side(&self) -> Option<PriceSide> {
        match self {
            TransactionType::Purchase | TransactionType::Receipt | TransactionType::Hurda => {
                Some(PriceSide::Buy)
            }
            TransactionType::Sale | TransactionType::Payment => Some(PriceSide::Sell),
            TransactionType::Exchange => None,
        }
    }

    /// Exchange-rate side for foreign cash
    ///
    /// Cash coming into the shop is bought at the buy rate; cash going out is
    /// sold at the sell rate. EXCHANGE picks its side per order.
    pub fn cash_side(&self) -> Option<PriceSide> {
        match self {
            TransactionType::Sale | TransactionType::Receipt => Some(PriceSide::Buy),
            TransactionType::Purchase | TransactionType::Payment | TransactionType::Hurda => {
                Some(PriceSide::Sell)
            }
            TransactionType::Exchange => None,
        }
    }

    /// Who hands over value to settle the transaction
    pub fn payer(&self) -> Option<PayerRole> {
        match self {
            TransactionType::Purchase | TransactionType::Payment | TransactionType::Hurda => {
                Some(PayerRole::Shop)
            }
            TransactionType::Sale | TransactionType::Receipt => Some(PayerRole::Party),
            TransactionType::Exchange => None,
        }
    }

    /// Trade transactions create an obligation; payments settle one
    pub fn obligation(&self) -> Option<Obligation> {
        match self {
            TransactionType::Purchase | TransactionType::Sale | TransactionType::Hurda => {
                Some(Obligation::New)
            }
            TransactionType::Payment | TransactionType::Receipt => Some(Obligation::Existing),
            TransactionType::Exchange => None,
        }
    }

    /// True when expected and actual amounts are reconciled
    pub fn is_reconciled(&self) -> bool {
        !matches!(self, TransactionType::Exchange)
    }

    /// True when the expected amount comes from the lines
    pub fn is_trade(&self) -> bool {
        matches!(
            self,
            TransactionType::Purchase | TransactionType::Sale | TransactionType::Hurda
        )
    }

    /// True when a party must always be selected
    pub fn requires_party(&self) -> bool {
        matches!(self, TransactionType::Payment | TransactionType::Receipt)
    }

    /// Line kinds this transaction may carry
    pub fn allows_line(&self, kind: LineKind) -> bool {
        match self {
            TransactionType::Purchase => {
                matches!(kind, LineKind::PoolPurchase | LineKind::ItemPurchase)
            }
            TransactionType::Sale => matches!(kind, LineKind::PoolSale | LineKind::LotSale),
            TransactionType::Hurda => matches!(kind, LineKind::Scrap),
            TransactionType::Payment | TransactionType::Receipt | TransactionType::Exchange => false,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TransactionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::validation_field(format!("Unknown transaction type: {}", s), "type_code"))
    }
}
