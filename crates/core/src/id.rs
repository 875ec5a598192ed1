//! Strongly-typed identifiers used across the ledger.
//!
//! Suppliers, beneficiaries, and stations are structurally identical but
//! must never be interchangeable across operation kinds, so each gets its
//! own newtype.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;

macro_rules! impl_uuid_newtype {
    ($t:ident, $name:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| LedgerError::validation($name, format!("invalid id: {e}")))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(WarehouseId, "warehouse", "Identifier of a warehouse.");
impl_uuid_newtype!(ItemId, "item", "Identifier of a stock item.");
impl_uuid_newtype!(SupplierId, "supplier", "Identifier of a supplier party.");
impl_uuid_newtype!(
    BeneficiaryId,
    "beneficiary",
    "Identifier of a beneficiary party."
);
impl_uuid_newtype!(StationId, "station", "Identifier of a station party.");
impl_uuid_newtype!(OperationId, "operation", "Identifier of a ledger operation.");
impl_uuid_newtype!(LineId, "line", "Identifier of one line within an operation.");
impl_uuid_newtype!(
    AttachmentId,
    "attachment",
    "Opaque reference to an externally stored attachment."
);
