//! The stock ledger store: one balance row per `(warehouse, item)` pair.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use fueldepot_core::{ItemId, LedgerError, LedgerResult, Quantity, UnitOfMeasure, WarehouseId};
use fueldepot_ledger::StockBalance;

/// One requested adjustment within an atomic batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockDelta {
    pub warehouse: WarehouseId,
    pub item: ItemId,
    pub delta: Decimal,
}

/// The only mutation path for `current_quantity`.
///
/// `adjust_batch` is all-or-nothing: every row is checked before any row is
/// written, so a transfer's debit is never visible without its credit and a
/// failed multi-line operation leaves every balance untouched.
pub trait StockStore: Send + Sync {
    fn get(&self, warehouse: WarehouseId, item: ItemId) -> Option<StockBalance>;

    fn list(&self) -> Vec<StockBalance>;

    /// Create a balance row; fails with `Conflict` when the pair exists.
    fn create(
        &self,
        warehouse: WarehouseId,
        item: ItemId,
        opening_balance: Quantity,
        unit: UnitOfMeasure,
        at: DateTime<Utc>,
    ) -> LedgerResult<StockBalance>;

    /// Apply a batch of signed deltas atomically. Fails with `NotFound`
    /// when a pair has no balance row and `InsufficientStock` when any row
    /// would go negative; in both cases nothing is written.
    fn adjust_batch(
        &self,
        deltas: &[StockDelta],
        at: DateTime<Utc>,
    ) -> LedgerResult<Vec<StockBalance>>;

    /// Single-row adjustment (a batch of one).
    fn adjust(
        &self,
        warehouse: WarehouseId,
        item: ItemId,
        delta: Decimal,
        at: DateTime<Utc>,
    ) -> LedgerResult<StockBalance> {
        let adjusted = self.adjust_batch(
            &[StockDelta {
                warehouse,
                item,
                delta,
            }],
            at,
        )?;
        adjusted
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::internal("adjust_batch returned no rows"))
    }
}

impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    fn get(&self, warehouse: WarehouseId, item: ItemId) -> Option<StockBalance> {
        (**self).get(warehouse, item)
    }

    fn list(&self) -> Vec<StockBalance> {
        (**self).list()
    }

    fn create(
        &self,
        warehouse: WarehouseId,
        item: ItemId,
        opening_balance: Quantity,
        unit: UnitOfMeasure,
        at: DateTime<Utc>,
    ) -> LedgerResult<StockBalance> {
        (**self).create(warehouse, item, opening_balance, unit, at)
    }

    fn adjust_batch(
        &self,
        deltas: &[StockDelta],
        at: DateTime<Utc>,
    ) -> LedgerResult<Vec<StockBalance>> {
        (**self).adjust_batch(deltas, at)
    }
}

/// In-memory stock ledger for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    rows: RwLock<HashMap<(WarehouseId, ItemId), StockBalance>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockStore for InMemoryStockStore {
    fn get(&self, warehouse: WarehouseId, item: ItemId) -> Option<StockBalance> {
        self.rows.read().ok()?.get(&(warehouse, item)).cloned()
    }

    fn list(&self) -> Vec<StockBalance> {
        self.rows
            .read()
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    fn create(
        &self,
        warehouse: WarehouseId,
        item: ItemId,
        opening_balance: Quantity,
        unit: UnitOfMeasure,
        at: DateTime<Utc>,
    ) -> LedgerResult<StockBalance> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| LedgerError::internal("stock lock poisoned"))?;

        if rows.contains_key(&(warehouse, item)) {
            return Err(LedgerError::conflict(format!(
                "stock record for warehouse {warehouse} item {item} already exists"
            )));
        }

        let balance = StockBalance::new(warehouse, item, opening_balance, unit, at);
        rows.insert((warehouse, item), balance.clone());
        Ok(balance)
    }

    fn adjust_batch(
        &self,
        deltas: &[StockDelta],
        at: DateTime<Utc>,
    ) -> LedgerResult<Vec<StockBalance>> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| LedgerError::internal("stock lock poisoned"))?;

        // Stage every adjustment on clones; commit only when all succeed.
        let mut staged: HashMap<(WarehouseId, ItemId), StockBalance> = HashMap::new();
        let mut order = Vec::with_capacity(deltas.len());

        for d in deltas {
            let key = (d.warehouse, d.item);
            if !staged.contains_key(&key) {
                let row = rows.get(&key).cloned().ok_or_else(|| {
                    LedgerError::not_found(format!(
                        "stock record for warehouse {} item {}",
                        d.warehouse, d.item
                    ))
                })?;
                staged.insert(key, row);
            }
            if let Some(row) = staged.get_mut(&key) {
                row.apply_delta(d.delta, at)?;
            }
            order.push(key);
        }

        let mut adjusted = Vec::with_capacity(order.len());
        for key in order {
            let row = staged[&key].clone();
            rows.insert(key, row.clone());
            adjusted.push(row);
        }

        Ok(adjusted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(n: i64) -> Quantity {
        Quantity::new(Decimal::from(n)).unwrap()
    }

    fn store_with(warehouse: WarehouseId, item: ItemId, opening: i64) -> InMemoryStockStore {
        let store = InMemoryStockStore::new();
        store
            .create(warehouse, item, qty(opening), UnitOfMeasure::Liters, Utc::now())
            .unwrap();
        store
    }

    #[test]
    fn create_rejects_duplicates() {
        let (w, i) = (WarehouseId::new(), ItemId::new());
        let store = store_with(w, i, 10);

        let err = store
            .create(w, i, qty(0), UnitOfMeasure::Liters, Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[test]
    fn adjust_moves_the_row() {
        let (w, i) = (WarehouseId::new(), ItemId::new());
        let store = store_with(w, i, 10);

        let updated = store.adjust(w, i, Decimal::from(5), Utc::now()).unwrap();
        assert_eq!(updated.current_quantity, qty(15));
        assert_eq!(store.get(w, i).unwrap().current_quantity, qty(15));
    }

    #[test]
    fn adjust_unknown_pair_is_not_found() {
        let store = InMemoryStockStore::new();
        let err = store
            .adjust(WarehouseId::new(), ItemId::new(), Decimal::ONE, Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let w1 = WarehouseId::new();
        let w2 = WarehouseId::new();
        let item = ItemId::new();

        let store = InMemoryStockStore::new();
        store
            .create(w1, item, qty(30), UnitOfMeasure::Liters, Utc::now())
            .unwrap();
        store
            .create(w2, item, qty(0), UnitOfMeasure::Liters, Utc::now())
            .unwrap();

        // Credit leg first, then a debit that must fail: neither sticks.
        let err = store
            .adjust_batch(
                &[
                    StockDelta {
                        warehouse: w2,
                        item,
                        delta: Decimal::from(40),
                    },
                    StockDelta {
                        warehouse: w1,
                        item,
                        delta: Decimal::from(-40),
                    },
                ],
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientStock(_)));
        assert_eq!(store.get(w1, item).unwrap().current_quantity, qty(30));
        assert_eq!(store.get(w2, item).unwrap().current_quantity, qty(0));

        // A feasible batch commits both legs.
        store
            .adjust_batch(
                &[
                    StockDelta {
                        warehouse: w1,
                        item,
                        delta: Decimal::from(-30),
                    },
                    StockDelta {
                        warehouse: w2,
                        item,
                        delta: Decimal::from(30),
                    },
                ],
                Utc::now(),
            )
            .unwrap();
        assert_eq!(store.get(w1, item).unwrap().current_quantity, qty(0));
        assert_eq!(store.get(w2, item).unwrap().current_quantity, qty(30));
    }

    #[test]
    fn repeated_pair_in_one_batch_accumulates() {
        let (w, i) = (WarehouseId::new(), ItemId::new());
        let store = store_with(w, i, 10);

        store
            .adjust_batch(
                &[
                    StockDelta {
                        warehouse: w,
                        item: i,
                        delta: Decimal::from(-6),
                    },
                    StockDelta {
                        warehouse: w,
                        item: i,
                        delta: Decimal::from(-4),
                    },
                ],
                Utc::now(),
            )
            .unwrap();
        assert_eq!(store.get(w, i).unwrap().current_quantity, Quantity::ZERO);
    }
}
