//! Identifiers
//!
//! Each entity gets its own UUID newtype so a karat id cannot be passed
//! where a product id is expected. Ids print with a short type prefix
//! (`PRD-…`) and parse with or without it; on the wire they are bare UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Random (v4) id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Time-ordered (v7) id, for records that are listed by creation
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Fixed id for well-known reference data
            pub const fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn prefix() -> &'static str {
                Self::PREFIX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bare = s
                    .strip_prefix(Self::PREFIX)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .unwrap_or(s);
                Uuid::parse_str(bare).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

entity_id!(
    /// A karat in the reference table
    KaratId => "KRT"
);
entity_id!(
    /// A price snapshot
    SnapshotId => "SNP"
);
entity_id!(ProductId => "PRD");
entity_id!(
    /// A product type such as "bracelet"; pools are keyed by type and karat
    ProductTypeId => "PTP"
);
entity_id!(
    /// A customer or supplier with a running gold balance
    PartyId => "PTY"
);
entity_id!(TransactionId => "TXN");
entity_id!(
    /// Chosen by the caller so a retried submission is stored once
    IdempotencyKey => "IDEM"
);
