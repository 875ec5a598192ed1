use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fueldepot_core::{ItemId, LedgerError, LedgerResult, LineId, Quantity};

/// One `(item, quantity)` entry of a Supply/Export/Transfer/Damage record.
///
/// A line is either returned-against or modified, never both; composing the
/// two on one line makes the adjustment order ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLine {
    pub id: LineId,
    pub item: ItemId,
    pub quantity: Quantity,
    /// Cumulative quantity returned against this line.
    pub returned_quantity: Quantity,
    /// Set once a modification has replaced this line's quantity.
    pub modified: bool,
}

impl OperationLine {
    pub fn new(item: ItemId, quantity: Quantity) -> Self {
        Self {
            id: LineId::new(),
            item,
            quantity,
            returned_quantity: Quantity::ZERO,
            modified: false,
        }
    }

    /// Original quantity net of cumulative returns.
    pub fn effective_quantity(&self) -> Quantity {
        // The over-return bound keeps returned_quantity <= quantity.
        self.quantity
            .checked_sub(self.returned_quantity)
            .unwrap_or(Quantity::ZERO)
    }

    pub fn has_returns(&self) -> bool {
        !self.returned_quantity.is_zero()
    }

    /// Book a partial return against this line.
    ///
    /// The cumulative returned quantity may never exceed the outstanding
    /// effective quantity; a request past the bound fails with `OverReturn`
    /// and leaves the line untouched.
    pub fn record_return(&mut self, returned: Quantity) -> LedgerResult<()> {
        if self.modified {
            return Err(LedgerError::conflict(
                "line quantity was modified; returns against it are not allowed",
            ));
        }

        if returned > self.effective_quantity() {
            return Err(LedgerError::over_return(format!(
                "line {}: outstanding {} but return of {} requested",
                self.id,
                self.effective_quantity(),
                returned
            )));
        }

        self.returned_quantity = self.returned_quantity.checked_add(returned);
        Ok(())
    }

    /// Unwind a previously booked return (administrative delete support).
    pub fn undo_return(&mut self, returned: Quantity) -> LedgerResult<()> {
        self.returned_quantity = self.returned_quantity.checked_sub(returned).ok_or_else(|| {
            LedgerError::internal(format!(
                "line {}: cannot unwind return of {} (only {} booked)",
                self.id, returned, self.returned_quantity
            ))
        })?;
        Ok(())
    }

    /// Unwind a modification, restoring the pre-modification quantity
    /// (administrative delete support).
    pub fn revert_modification(&mut self, old_quantity: Quantity) -> LedgerResult<()> {
        if !self.modified {
            return Err(LedgerError::internal(format!(
                "line {} has no modification to revert",
                self.id
            )));
        }
        self.quantity = old_quantity;
        self.modified = false;
        Ok(())
    }

    /// Replace this line's quantity, returning the signed stock delta.
    ///
    /// `old_quantity` must match the current effective quantity (optimistic
    /// concurrency check); lines with outstanding returns cannot be
    /// modified.
    pub fn replace_quantity(
        &mut self,
        old_quantity: Quantity,
        new_quantity: Quantity,
    ) -> LedgerResult<Decimal> {
        if self.has_returns() {
            return Err(LedgerError::conflict(
                "line has outstanding returns; modification is not allowed",
            ));
        }

        if old_quantity != self.effective_quantity() {
            return Err(LedgerError::stale_modification(format!(
                "line {}: submitted old quantity {} but line is at {}",
                self.id,
                old_quantity,
                self.effective_quantity()
            )));
        }

        let delta = new_quantity.value() - self.quantity.value();
        self.quantity = new_quantity;
        self.modified = true;
        Ok(delta)
    }
}
