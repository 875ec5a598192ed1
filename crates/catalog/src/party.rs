//! Counterparty reference entities.
//!
//! Suppliers feed Supply operations, beneficiaries receive Exports, and
//! stations tag supply provenance. The three are structurally identical but
//! carry distinct id types, so an operation can never be created against
//! the wrong kind of party.

use serde::{Deserialize, Serialize};

use fueldepot_core::{BeneficiaryId, LedgerError, LedgerResult, StationId, SupplierId};

macro_rules! define_party {
    ($t:ident, $id:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $t {
            pub id: $id,
            pub name: String,
            pub phone: Option<String>,
            pub active: bool,
        }

        impl $t {
            pub fn new(id: $id, name: impl Into<String>, phone: Option<String>) -> LedgerResult<Self> {
                let name = name.into();
                if name.trim().is_empty() {
                    return Err(LedgerError::validation("name", "must not be empty"));
                }
                Ok(Self {
                    id,
                    name,
                    phone,
                    active: true,
                })
            }

            pub fn deactivate(&mut self) {
                self.active = false;
            }

            pub fn activate(&mut self) {
                self.active = true;
            }

            /// Inactive parties cannot be referenced by new operations.
            pub fn can_transact(&self) -> bool {
                self.active
            }
        }
    };
}

define_party!(Supplier, SupplierId, "A supplier delivering stock into a warehouse.");
define_party!(
    Beneficiary,
    BeneficiaryId,
    "A beneficiary receiving dispatched stock."
);
define_party!(Station, StationId, "A station associated with supply provenance.");
