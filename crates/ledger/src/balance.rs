use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fueldepot_core::{ItemId, LedgerError, LedgerResult, Quantity, UnitOfMeasure, WarehouseId};

/// Current and opening stock for one `(warehouse, item)` pair.
///
/// `opening_balance` and `unit_of_measure` are fixed at creation.
/// `current_quantity` moves only through [`StockBalance::apply_delta`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBalance {
    pub warehouse: WarehouseId,
    pub item: ItemId,
    pub opening_balance: Quantity,
    pub current_quantity: Quantity,
    pub unit_of_measure: UnitOfMeasure,
    pub last_updated: DateTime<Utc>,
}

impl StockBalance {
    /// A fresh balance row. Current quantity starts at the opening balance.
    pub fn new(
        warehouse: WarehouseId,
        item: ItemId,
        opening_balance: Quantity,
        unit_of_measure: UnitOfMeasure,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            warehouse,
            item,
            opening_balance,
            current_quantity: opening_balance,
            unit_of_measure,
            last_updated: at,
        }
    }

    /// Apply a signed delta to `current_quantity`.
    ///
    /// Fails with `InsufficientStock` when the result would be negative,
    /// leaving the row untouched. Updates `last_updated` on success.
    pub fn apply_delta(&mut self, delta: Decimal, at: DateTime<Utc>) -> LedgerResult<()> {
        let next = self.current_quantity.checked_apply(delta).ok_or_else(|| {
            LedgerError::insufficient_stock(format!(
                "warehouse {} item {}: have {}, requested change {}",
                self.warehouse, self.item, self.current_quantity, delta
            ))
        })?;

        self.current_quantity = next;
        self.last_updated = at;
        Ok(())
    }
}
