use serde::{Deserialize, Serialize};

use fueldepot_core::{LedgerError, LedgerResult, WarehouseId};

/// A fuel warehouse.
///
/// Warehouses form a tree: `parent` points at the main warehouse this one
/// is affiliated to, and the chain must stay acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub classification: String,
    pub storekeeper: String,
    pub phone: Option<String>,
    pub parent: Option<WarehouseId>,
    pub active: bool,
}

impl Warehouse {
    pub fn new(
        id: WarehouseId,
        name: impl Into<String>,
        classification: impl Into<String>,
        storekeeper: impl Into<String>,
        phone: Option<String>,
        parent: Option<WarehouseId>,
    ) -> LedgerResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::validation("name", "must not be empty"));
        }
        if parent == Some(id) {
            return Err(LedgerError::validation(
                "parent",
                "a warehouse cannot be its own parent",
            ));
        }
        Ok(Self {
            id,
            name,
            classification: classification.into(),
            storekeeper: storekeeper.into(),
            phone,
            parent,
            active: true,
        })
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Whether this warehouse may participate in operations.
    pub fn can_transact(&self) -> bool {
        self.active
    }
}

/// Check that linking `child -> parent` keeps every parent chain acyclic.
///
/// `parent_of` resolves the current parent of any warehouse; the candidate
/// link is overlaid on top of it. Walks at most the chain length, so an
/// existing (invalid) cycle elsewhere also terminates.
pub fn parent_chain_is_acyclic(
    child: WarehouseId,
    parent: WarehouseId,
    parent_of: impl Fn(WarehouseId) -> Option<WarehouseId>,
) -> bool {
    let mut seen = vec![child];
    let mut cursor = Some(parent);

    while let Some(current) = cursor {
        if seen.contains(&current) {
            return false;
        }
        seen.push(current);
        cursor = parent_of(current);
    }

    true
}
