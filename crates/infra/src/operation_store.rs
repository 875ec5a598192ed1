//! Append-only operation history.

use std::sync::{Arc, RwLock};

use fueldepot_core::{LedgerError, LedgerResult, OperationId};
use fueldepot_operations::{OperationKind, OperationRecord};

/// The immutable operation history.
///
/// Records are appended once and never edited, with two narrow exceptions
/// owned by the engine: line bookkeeping on an original record when a
/// return or modification lands (`update`), and the administrative delete
/// (`remove`) after its ledger effect has been re-reversed.
pub trait OperationStore: Send + Sync {
    fn append(&self, record: OperationRecord) -> LedgerResult<()>;

    fn get(&self, id: OperationId) -> Option<OperationRecord>;

    /// Full history in append order.
    fn list(&self) -> Vec<OperationRecord>;

    fn list_kind(&self, kind: OperationKind) -> Vec<OperationRecord>;

    /// Apply `patch` to one record in place; the record is returned as
    /// patched. Nothing is written when `patch` fails.
    fn update(
        &self,
        id: OperationId,
        patch: &mut dyn FnMut(&mut OperationRecord) -> LedgerResult<()>,
    ) -> LedgerResult<OperationRecord>;

    fn remove(&self, id: OperationId) -> LedgerResult<OperationRecord>;

    /// Whether any record references `id` as its original operation.
    fn any_referencing(&self, id: OperationId) -> bool;
}

impl<S> OperationStore for Arc<S>
where
    S: OperationStore + ?Sized,
{
    fn append(&self, record: OperationRecord) -> LedgerResult<()> {
        (**self).append(record)
    }

    fn get(&self, id: OperationId) -> Option<OperationRecord> {
        (**self).get(id)
    }

    fn list(&self) -> Vec<OperationRecord> {
        (**self).list()
    }

    fn list_kind(&self, kind: OperationKind) -> Vec<OperationRecord> {
        (**self).list_kind(kind)
    }

    fn update(
        &self,
        id: OperationId,
        patch: &mut dyn FnMut(&mut OperationRecord) -> LedgerResult<()>,
    ) -> LedgerResult<OperationRecord> {
        (**self).update(id, patch)
    }

    fn remove(&self, id: OperationId) -> LedgerResult<OperationRecord> {
        (**self).remove(id)
    }

    fn any_referencing(&self, id: OperationId) -> bool {
        (**self).any_referencing(id)
    }
}

/// In-memory history for tests/dev. Keeps append order.
#[derive(Debug, Default)]
pub struct InMemoryOperationStore {
    records: RwLock<Vec<OperationRecord>>,
}

impl InMemoryOperationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OperationStore for InMemoryOperationStore {
    fn append(&self, record: OperationRecord) -> LedgerResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerError::internal("operation lock poisoned"))?;

        if records.iter().any(|r| r.id == record.id) {
            return Err(LedgerError::conflict(format!(
                "operation {} already recorded",
                record.id
            )));
        }

        records.push(record);
        Ok(())
    }

    fn get(&self, id: OperationId) -> Option<OperationRecord> {
        self.records
            .read()
            .ok()?
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn list(&self) -> Vec<OperationRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    fn list_kind(&self, kind: OperationKind) -> Vec<OperationRecord> {
        self.records
            .read()
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.kind() == kind)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn update(
        &self,
        id: OperationId,
        patch: &mut dyn FnMut(&mut OperationRecord) -> LedgerResult<()>,
    ) -> LedgerResult<OperationRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerError::internal("operation lock poisoned"))?;

        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| LedgerError::not_found(format!("operation {id}")))?;

        // Patch a scratch copy so a failing patch leaves history untouched.
        let mut patched = record.clone();
        patch(&mut patched)?;
        *record = patched.clone();
        Ok(patched)
    }

    fn remove(&self, id: OperationId) -> LedgerResult<OperationRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerError::internal("operation lock poisoned"))?;

        let idx = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| LedgerError::not_found(format!("operation {id}")))?;
        Ok(records.remove(idx))
    }

    fn any_referencing(&self, id: OperationId) -> bool {
        self.records
            .read()
            .map(|records| records.iter().any(|r| r.body.references() == Some(id)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fueldepot_core::{ItemId, Quantity, SupplierId, WarehouseId};
    use fueldepot_operations::{OperationBody, OperationLine, ReturnBody, ReturnLine, SupplyBody};
    use rust_decimal::Decimal;

    fn qty(n: i64) -> Quantity {
        Quantity::new(Decimal::from(n)).unwrap()
    }

    fn supply_record() -> OperationRecord {
        OperationRecord {
            id: OperationId::new(),
            operation_date: Utc::now(),
            paper_ref_number: None,
            statement: None,
            description: None,
            attachments: vec![],
            recorded_at: Utc::now(),
            body: OperationBody::Supply(SupplyBody {
                warehouse: WarehouseId::new(),
                supplier: SupplierId::new(),
                station: None,
                supply_bon_number: None,
                deliverer_name: None,
                deliverer_job_number: None,
                lines: vec![OperationLine::new(ItemId::new(), qty(10))],
            }),
        }
    }

    #[test]
    fn append_then_get_round_trips() {
        let store = InMemoryOperationStore::new();
        let record = supply_record();
        store.append(record.clone()).unwrap();

        assert_eq!(store.get(record.id), Some(record.clone()));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list_kind(OperationKind::Supply).len(), 1);
        assert!(store.list_kind(OperationKind::Damage).is_empty());
    }

    #[test]
    fn duplicate_append_conflicts() {
        let store = InMemoryOperationStore::new();
        let record = supply_record();
        store.append(record.clone()).unwrap();
        assert!(matches!(
            store.append(record).unwrap_err(),
            LedgerError::Conflict(_)
        ));
    }

    #[test]
    fn failed_patch_leaves_record_untouched() {
        let store = InMemoryOperationStore::new();
        let record = supply_record();
        let id = record.id;
        store.append(record.clone()).unwrap();

        let err = store
            .update(id, &mut |r| {
                r.paper_ref_number = Some("should not stick".into());
                Err(LedgerError::conflict("nope"))
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert_eq!(store.get(id), Some(record));
    }

    #[test]
    fn tracks_referencing_records() {
        let store = InMemoryOperationStore::new();
        let original = supply_record();
        let original_id = original.id;
        let item = original.body.lines().unwrap()[0].item;
        store.append(original).unwrap();

        assert!(!store.any_referencing(original_id));

        store
            .append(OperationRecord {
                id: OperationId::new(),
                operation_date: Utc::now(),
                paper_ref_number: None,
                statement: None,
                description: None,
                attachments: vec![],
                recorded_at: Utc::now(),
                body: OperationBody::ReturnSupply(ReturnBody {
                    original_operation: original_id,
                    lines: vec![ReturnLine {
                        item,
                        returned_quantity: qty(2),
                    }],
                }),
            })
            .unwrap();

        assert!(store.any_referencing(original_id));
    }

    #[test]
    fn remove_returns_the_record() {
        let store = InMemoryOperationStore::new();
        let record = supply_record();
        let id = record.id;
        store.append(record).unwrap();

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.get(id).is_none());
        assert!(matches!(
            store.remove(id).unwrap_err(),
            LedgerError::NotFound(_)
        ));
    }
}
