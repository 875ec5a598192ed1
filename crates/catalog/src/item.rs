use serde::{Deserialize, Serialize};

use fueldepot_core::{ItemId, LedgerError, LedgerResult};

/// A stock item (a fuel grade or tracked good).
///
/// Identity is immutable; items are soft-deactivated, never removed, so
/// historical operations keep resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub active: bool,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> LedgerResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::validation("name", "must not be empty"));
        }
        Ok(Self {
            id,
            name,
            active: true,
        })
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }
}
