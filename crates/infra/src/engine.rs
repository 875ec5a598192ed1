//! Operation execution pipeline (application-level orchestration).
//!
//! The engine runs every operation kind through the same pipeline:
//!
//! ```text
//! Request
//!   ↓
//! 1. Shape validation (field-to-message map)
//!   ↓
//! 2. Reference resolution against the catalog (exists + active)
//!   ↓
//! 3. Business validation on clones (sufficiency, over-return bound,
//!    stale-modification check, return/modify exclusion)
//!   ↓
//! 4. Atomic ledger mutation (`adjust_batch`, all-or-nothing)
//!   ↓
//! 5. Bookkeeping on referenced original lines
//!   ↓
//! 6. Append the immutable record, publish ledger events
//! ```
//!
//! Steps 1-3 touch nothing; step 4 is atomic; steps 5-6 repeat decisions
//! already proven valid under the apply gate. Applies are serialized behind
//! that gate; reads and reports never take it.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use fueldepot_core::{
    ItemId, LedgerError, LedgerResult, OperationId, Quantity, UnitOfMeasure, WarehouseId,
};
use fueldepot_events::EventBus;
use fueldepot_ledger::{StockBalance, StockEvent};
use fueldepot_operations::{
    DamageBody, DamageRequest, ExportBody, ExportRequest, LineRequest, ModifyBody, ModifyRequest,
    OperationBody, OperationDetails, OperationLine, OperationRecord, ReturnBody, ReturnLine,
    ReturnRequest, SupplyBody, SupplyRequest, TransferBody, TransferRequest,
};

use crate::catalog_store::CatalogStore;
use crate::operation_store::OperationStore;
use crate::stock_store::{StockDelta, StockStore};

/// Which side of the ledger a return or modification reverses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Side {
    Supply,
    Export,
}

/// Validates and atomically applies operations against catalog + ledger,
/// then appends the immutable record and publishes ledger events.
pub struct OperationEngine<C, S, O, B> {
    catalog: C,
    stock: S,
    history: O,
    bus: B,
    /// Serializes the apply pipeline. Reads go straight to the stores.
    apply_gate: Mutex<()>,
}

impl<C, S, O, B> OperationEngine<C, S, O, B>
where
    C: CatalogStore,
    S: StockStore,
    O: OperationStore,
    B: EventBus<StockEvent>,
{
    pub fn new(catalog: C, stock: S, history: O, bus: B) -> Self {
        Self {
            catalog,
            stock,
            history,
            bus,
            apply_gate: Mutex::new(()),
        }
    }

    /// Create a `(warehouse, item)` balance row and announce it.
    pub fn create_balance(
        &self,
        warehouse: WarehouseId,
        item: ItemId,
        opening_balance: Decimal,
        unit: UnitOfMeasure,
    ) -> LedgerResult<StockBalance> {
        let _gate = self.gate()?;

        self.resolve_warehouse("warehouse", warehouse)?;
        self.resolve_item("item", item)?;
        let opening = Quantity::new(opening_balance)?;

        let now = Utc::now();
        let balance = self.stock.create(warehouse, item, opening, unit, now)?;
        self.publish(StockEvent::BalanceCreated {
            warehouse,
            item,
            opening_balance: opening,
            occurred_at: now,
        });
        Ok(balance)
    }

    pub fn supply(&self, req: SupplyRequest) -> LedgerResult<OperationRecord> {
        req.validate()?;
        let _gate = self.gate()?;

        self.resolve_warehouse("warehouse", req.warehouse)?;
        self.resolve_supplier("supplier", req.supplier)?;
        if let Some(station) = req.station {
            self.resolve_station("station", station)?;
        }
        let lines = self.resolve_lines(&req.lines)?;

        let deltas: Vec<StockDelta> = lines
            .iter()
            .map(|l| StockDelta {
                warehouse: req.warehouse,
                item: l.item,
                delta: l.quantity.value(),
            })
            .collect();

        self.commit(
            req.details,
            OperationBody::Supply(SupplyBody {
                warehouse: req.warehouse,
                supplier: req.supplier,
                station: req.station,
                supply_bon_number: req.supply_bon_number,
                deliverer_name: req.deliverer_name,
                deliverer_job_number: req.deliverer_job_number,
                lines,
            }),
            &deltas,
        )
    }

    pub fn export(&self, req: ExportRequest) -> LedgerResult<OperationRecord> {
        req.validate()?;
        let _gate = self.gate()?;

        self.resolve_warehouse("warehouse", req.warehouse)?;
        self.resolve_beneficiary("beneficiary", req.beneficiary)?;
        let lines = self.resolve_lines(&req.lines)?;

        let deltas: Vec<StockDelta> = lines
            .iter()
            .map(|l| StockDelta {
                warehouse: req.warehouse,
                item: l.item,
                delta: -l.quantity.value(),
            })
            .collect();

        self.commit(
            req.details,
            OperationBody::Export(ExportBody {
                warehouse: req.warehouse,
                beneficiary: req.beneficiary,
                recipient_name: req.recipient_name,
                recipient_job_number: req.recipient_job_number,
                lines,
            }),
            &deltas,
        )
    }

    /// Debit source, credit destination, as one atomic unit.
    pub fn transfer(&self, req: TransferRequest) -> LedgerResult<OperationRecord> {
        req.validate()?;
        let _gate = self.gate()?;

        self.resolve_warehouse("from_warehouse", req.from_warehouse)?;
        self.resolve_warehouse("to_warehouse", req.to_warehouse)?;
        let lines = self.resolve_lines(&req.lines)?;

        let mut deltas = Vec::with_capacity(lines.len() * 2);
        for l in &lines {
            deltas.push(StockDelta {
                warehouse: req.from_warehouse,
                item: l.item,
                delta: -l.quantity.value(),
            });
            deltas.push(StockDelta {
                warehouse: req.to_warehouse,
                item: l.item,
                delta: l.quantity.value(),
            });
        }

        self.commit(
            req.details,
            OperationBody::Transfer(TransferBody {
                from_warehouse: req.from_warehouse,
                to_warehouse: req.to_warehouse,
                deliverer_name: req.deliverer_name,
                deliverer_job_number: req.deliverer_job_number,
                lines,
            }),
            &deltas,
        )
    }

    pub fn damage(&self, req: DamageRequest) -> LedgerResult<OperationRecord> {
        req.validate()?;
        let _gate = self.gate()?;

        self.resolve_warehouse("warehouse", req.warehouse)?;
        let lines = self.resolve_lines(&req.lines)?;

        let deltas: Vec<StockDelta> = lines
            .iter()
            .map(|l| StockDelta {
                warehouse: req.warehouse,
                item: l.item,
                delta: -l.quantity.value(),
            })
            .collect();

        self.commit(
            req.details,
            OperationBody::Damage(DamageBody {
                warehouse: req.warehouse,
                reason: req.reason,
                lines,
            }),
            &deltas,
        )
    }

    /// Partial reversal of a Supply: goods leave again, stock decreases.
    pub fn return_supply(&self, req: ReturnRequest) -> LedgerResult<OperationRecord> {
        self.apply_return(req, Side::Supply)
    }

    /// Partial reversal of an Export: goods come back, stock increases.
    pub fn return_export(&self, req: ReturnRequest) -> LedgerResult<OperationRecord> {
        self.apply_return(req, Side::Export)
    }

    pub fn modify_supply(&self, req: ModifyRequest) -> LedgerResult<OperationRecord> {
        self.apply_modify(req, Side::Supply)
    }

    pub fn modify_export(&self, req: ModifyRequest) -> LedgerResult<OperationRecord> {
        self.apply_modify(req, Side::Export)
    }

    /// Administrative delete: re-reverse the record's ledger effect, unwind
    /// any bookkeeping it left on its original operation, and drop it from
    /// history. Refused while later records reference it.
    pub fn delete_operation(&self, id: OperationId) -> LedgerResult<OperationRecord> {
        let _gate = self.gate()?;

        let record = self
            .history
            .get(id)
            .ok_or_else(|| LedgerError::not_found(format!("operation {id}")))?;

        if self.history.any_referencing(id) {
            return Err(LedgerError::conflict(
                "operation has returns or modifications recorded against it",
            ));
        }

        let deltas = self.reversal_deltas(&record)?;
        let now = Utc::now();
        let adjusted = self.stock.adjust_batch(&deltas, now)?;

        match &record.body {
            OperationBody::ReturnSupply(b) | OperationBody::ReturnExport(b) => {
                let lines = b.lines.clone();
                self.history.update(b.original_operation, &mut |original| {
                    for ret in &lines {
                        let line = original
                            .body
                            .lines_mut()
                            .and_then(|ls| ls.iter_mut().find(|l| l.item == ret.item))
                            .ok_or_else(|| {
                                LedgerError::internal("original line vanished during delete")
                            })?;
                        line.undo_return(ret.returned_quantity)?;
                    }
                    Ok(())
                })?;
            }
            OperationBody::ModifySupply(b) | OperationBody::ModifyExport(b) => {
                let (line_id, old_quantity) = (b.original_line, b.old_quantity);
                self.history.update(b.original_operation, &mut |original| {
                    let line = original
                        .body
                        .lines_mut()
                        .and_then(|ls| ls.iter_mut().find(|l| l.id == line_id))
                        .ok_or_else(|| {
                            LedgerError::internal("original line vanished during delete")
                        })?;
                    line.revert_modification(old_quantity)
                })?;
            }
            _ => {}
        }

        let removed = self.history.remove(id)?;
        self.publish_adjustments(&deltas, &adjusted, now);
        Ok(removed)
    }

    // ---- pipeline pieces -------------------------------------------------

    fn gate(&self) -> LedgerResult<std::sync::MutexGuard<'_, ()>> {
        self.apply_gate
            .lock()
            .map_err(|_| LedgerError::internal("apply gate poisoned"))
    }

    /// Steps 4-6 for the single-phase kinds: atomic adjust, append, publish.
    fn commit(
        &self,
        details: OperationDetails,
        body: OperationBody,
        deltas: &[StockDelta],
    ) -> LedgerResult<OperationRecord> {
        let now = Utc::now();
        let adjusted = self.stock.adjust_batch(deltas, now)?;

        let record = Self::record(details, body, now);
        self.history.append(record.clone())?;
        self.publish_adjustments(deltas, &adjusted, now);
        Ok(record)
    }

    fn apply_return(&self, req: ReturnRequest, side: Side) -> LedgerResult<OperationRecord> {
        req.validate()?;
        let _gate = self.gate()?;

        let original = self
            .history
            .get(req.original_operation)
            .ok_or_else(|| {
                LedgerError::not_found(format!("operation {}", req.original_operation))
            })?;

        let warehouse = match (&original.body, side) {
            (OperationBody::Supply(b), Side::Supply) => b.warehouse,
            (OperationBody::Export(b), Side::Export) => b.warehouse,
            (_, Side::Supply) => {
                return Err(LedgerError::validation(
                    "original_operation",
                    "must reference a supply operation",
                ));
            }
            (_, Side::Export) => {
                return Err(LedgerError::validation(
                    "original_operation",
                    "must reference an export operation",
                ));
            }
        };

        // Dry-run the bookkeeping on a clone: catches unknown items, the
        // over-return bound, and returns against modified lines.
        let mut dry = original.clone();
        let mut return_lines = Vec::with_capacity(req.lines.len());
        for (idx, line_req) in req.lines.iter().enumerate() {
            let returned = Quantity::positive(line_req.returned_quantity)?;
            let line = dry
                .body
                .lines_mut()
                .and_then(|ls| ls.iter_mut().find(|l| l.item == line_req.item))
                .ok_or_else(|| {
                    LedgerError::validation(
                        format!("lines[{idx}].item"),
                        "item does not appear in the original operation",
                    )
                })?;
            line.record_return(returned)?;
            return_lines.push(ReturnLine {
                item: line_req.item,
                returned_quantity: returned,
            });
        }

        let deltas: Vec<StockDelta> = return_lines
            .iter()
            .map(|l| StockDelta {
                warehouse,
                item: l.item,
                delta: match side {
                    Side::Supply => -l.returned_quantity.value(),
                    Side::Export => l.returned_quantity.value(),
                },
            })
            .collect();

        let now = Utc::now();
        let adjusted = self.stock.adjust_batch(&deltas, now)?;

        // Re-run the proven bookkeeping against stored history.
        let lines_for_patch = return_lines.clone();
        self.history.update(original.id, &mut |record| {
            for ret in &lines_for_patch {
                let line = record
                    .body
                    .lines_mut()
                    .and_then(|ls| ls.iter_mut().find(|l| l.item == ret.item))
                    .ok_or_else(|| LedgerError::internal("original line vanished during return"))?;
                line.record_return(ret.returned_quantity)?;
            }
            Ok(())
        })?;

        let body = match side {
            Side::Supply => OperationBody::ReturnSupply(ReturnBody {
                original_operation: original.id,
                lines: return_lines,
            }),
            Side::Export => OperationBody::ReturnExport(ReturnBody {
                original_operation: original.id,
                lines: return_lines,
            }),
        };

        let record = Self::record(req.details, body, now);
        self.history.append(record.clone())?;
        self.publish_adjustments(&deltas, &adjusted, now);
        Ok(record)
    }

    fn apply_modify(&self, req: ModifyRequest, side: Side) -> LedgerResult<OperationRecord> {
        req.validate()?;
        let _gate = self.gate()?;

        let original = self
            .history
            .get(req.original_operation)
            .ok_or_else(|| {
                LedgerError::not_found(format!("operation {}", req.original_operation))
            })?;

        let warehouse = match (&original.body, side) {
            (OperationBody::Supply(b), Side::Supply) => b.warehouse,
            (OperationBody::Export(b), Side::Export) => b.warehouse,
            (_, Side::Supply) => {
                return Err(LedgerError::validation(
                    "original_operation",
                    "must reference a supply operation",
                ));
            }
            (_, Side::Export) => {
                return Err(LedgerError::validation(
                    "original_operation",
                    "must reference an export operation",
                ));
            }
        };

        let line = original
            .line(req.original_line)
            .ok_or_else(|| {
                LedgerError::not_found(format!(
                    "line {} on operation {}",
                    req.original_line, original.id
                ))
            })?
            .clone();

        let old = Quantity::new(req.old_quantity)?;
        let new = Quantity::positive(req.new_quantity)?;

        // Dry-run: stale check + returned-line exclusion, plus line delta.
        let mut dry = line.clone();
        let line_delta = dry.replace_quantity(old, new)?;

        // A bigger supply line adds stock; a bigger export line removes it.
        let stock_delta = match side {
            Side::Supply => line_delta,
            Side::Export => -line_delta,
        };

        let now = Utc::now();
        let adjusted = self.stock.adjust(warehouse, line.item, stock_delta, now)?;

        self.history.update(original.id, &mut |record| {
            let stored = record
                .body
                .lines_mut()
                .and_then(|ls| ls.iter_mut().find(|l| l.id == req.original_line))
                .ok_or_else(|| {
                    LedgerError::internal("original line vanished during modification")
                })?;
            stored.replace_quantity(old, new)?;
            Ok(())
        })?;

        let modify = ModifyBody {
            original_operation: original.id,
            original_line: req.original_line,
            item: line.item,
            old_quantity: old,
            new_quantity: new,
            reason: req.reason,
        };
        let body = match side {
            Side::Supply => OperationBody::ModifySupply(modify),
            Side::Export => OperationBody::ModifyExport(modify),
        };

        let record = Self::record(req.details, body, now);
        self.history.append(record.clone())?;
        self.publish(StockEvent::StockLevelChanged {
            warehouse,
            item: line.item,
            delta: stock_delta,
            quantity_after: adjusted.current_quantity,
            occurred_at: now,
        });
        Ok(record)
    }

    /// The batch that undoes a record's net ledger effect.
    fn reversal_deltas(&self, record: &OperationRecord) -> LedgerResult<Vec<StockDelta>> {
        let original_warehouse = |id: OperationId| -> LedgerResult<WarehouseId> {
            let original = self
                .history
                .get(id)
                .ok_or_else(|| LedgerError::internal("original operation vanished"))?;
            match &original.body {
                OperationBody::Supply(b) => Ok(b.warehouse),
                OperationBody::Export(b) => Ok(b.warehouse),
                _ => Err(LedgerError::internal(
                    "referenced operation is neither supply nor export",
                )),
            }
        };

        Ok(match &record.body {
            OperationBody::Supply(b) => b
                .lines
                .iter()
                .map(|l| StockDelta {
                    warehouse: b.warehouse,
                    item: l.item,
                    delta: -l.quantity.value(),
                })
                .collect(),
            OperationBody::Export(b) => b
                .lines
                .iter()
                .map(|l| StockDelta {
                    warehouse: b.warehouse,
                    item: l.item,
                    delta: l.quantity.value(),
                })
                .collect(),
            OperationBody::Damage(b) => b
                .lines
                .iter()
                .map(|l| StockDelta {
                    warehouse: b.warehouse,
                    item: l.item,
                    delta: l.quantity.value(),
                })
                .collect(),
            OperationBody::Transfer(b) => {
                let mut deltas = Vec::with_capacity(b.lines.len() * 2);
                for l in &b.lines {
                    deltas.push(StockDelta {
                        warehouse: b.from_warehouse,
                        item: l.item,
                        delta: l.quantity.value(),
                    });
                    deltas.push(StockDelta {
                        warehouse: b.to_warehouse,
                        item: l.item,
                        delta: -l.quantity.value(),
                    });
                }
                deltas
            }
            OperationBody::ReturnSupply(b) => {
                let warehouse = original_warehouse(b.original_operation)?;
                b.lines
                    .iter()
                    .map(|l| StockDelta {
                        warehouse,
                        item: l.item,
                        delta: l.returned_quantity.value(),
                    })
                    .collect()
            }
            OperationBody::ReturnExport(b) => {
                let warehouse = original_warehouse(b.original_operation)?;
                b.lines
                    .iter()
                    .map(|l| StockDelta {
                        warehouse,
                        item: l.item,
                        delta: -l.returned_quantity.value(),
                    })
                    .collect()
            }
            OperationBody::ModifySupply(b) => {
                let warehouse = original_warehouse(b.original_operation)?;
                vec![StockDelta {
                    warehouse,
                    item: b.item,
                    delta: b.old_quantity.value() - b.new_quantity.value(),
                }]
            }
            OperationBody::ModifyExport(b) => {
                let warehouse = original_warehouse(b.original_operation)?;
                vec![StockDelta {
                    warehouse,
                    item: b.item,
                    delta: b.new_quantity.value() - b.old_quantity.value(),
                }]
            }
        })
    }

    // ---- resolution helpers ---------------------------------------------

    fn resolve_warehouse(&self, field: &str, id: WarehouseId) -> LedgerResult<()> {
        let warehouse = self
            .catalog
            .warehouse(id)
            .ok_or_else(|| LedgerError::not_found(format!("warehouse {id}")))?;
        if !warehouse.can_transact() {
            return Err(LedgerError::validation(field, "warehouse is not active"));
        }
        Ok(())
    }

    fn resolve_item(&self, field: &str, id: ItemId) -> LedgerResult<()> {
        let item = self
            .catalog
            .item(id)
            .ok_or_else(|| LedgerError::not_found(format!("item {id}")))?;
        if !item.active {
            return Err(LedgerError::validation(field, "item is not active"));
        }
        Ok(())
    }

    fn resolve_supplier(&self, field: &str, id: fueldepot_core::SupplierId) -> LedgerResult<()> {
        let supplier = self
            .catalog
            .supplier(id)
            .ok_or_else(|| LedgerError::not_found(format!("supplier {id}")))?;
        if !supplier.can_transact() {
            return Err(LedgerError::validation(field, "supplier is not active"));
        }
        Ok(())
    }

    fn resolve_beneficiary(
        &self,
        field: &str,
        id: fueldepot_core::BeneficiaryId,
    ) -> LedgerResult<()> {
        let beneficiary = self
            .catalog
            .beneficiary(id)
            .ok_or_else(|| LedgerError::not_found(format!("beneficiary {id}")))?;
        if !beneficiary.can_transact() {
            return Err(LedgerError::validation(field, "beneficiary is not active"));
        }
        Ok(())
    }

    fn resolve_station(&self, field: &str, id: fueldepot_core::StationId) -> LedgerResult<()> {
        let station = self
            .catalog
            .station(id)
            .ok_or_else(|| LedgerError::not_found(format!("station {id}")))?;
        if !station.can_transact() {
            return Err(LedgerError::validation(field, "station is not active"));
        }
        Ok(())
    }

    /// Resolve every line's item and build the record lines.
    fn resolve_lines(&self, lines: &[LineRequest]) -> LedgerResult<Vec<OperationLine>> {
        let mut resolved = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            self.resolve_item(&format!("lines[{idx}].item"), line.item)?;
            resolved.push(OperationLine::new(line.item, Quantity::positive(line.quantity)?));
        }
        Ok(resolved)
    }

    // ---- record + event plumbing ----------------------------------------

    fn record(details: OperationDetails, body: OperationBody, now: DateTime<Utc>) -> OperationRecord {
        OperationRecord {
            id: OperationId::new(),
            operation_date: details.operation_date,
            paper_ref_number: details.paper_ref_number,
            statement: details.statement,
            description: details.description,
            attachments: details.attachments,
            recorded_at: now,
            body,
        }
    }

    fn publish_adjustments(
        &self,
        deltas: &[StockDelta],
        adjusted: &[StockBalance],
        occurred_at: DateTime<Utc>,
    ) {
        for (delta, balance) in deltas.iter().zip(adjusted) {
            self.publish(StockEvent::StockLevelChanged {
                warehouse: delta.warehouse,
                item: delta.item,
                delta: delta.delta,
                quantity_after: balance.current_quantity,
                occurred_at,
            });
        }
    }

    fn publish(&self, event: StockEvent) {
        if let Err(e) = self.bus.publish(event) {
            tracing::warn!("stock event publish failed: {e:?}");
        }
    }
}
