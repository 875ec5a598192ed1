//! Report folds over operation history + balance snapshots.

use std::collections::HashMap;

use fueldepot_core::{BeneficiaryId, ItemId, OperationId, StationId, SupplierId, WarehouseId};
use fueldepot_ledger::StockBalance;
use fueldepot_operations::{OperationBody, OperationKind, OperationRecord};

use crate::view::{
    DateRange, ItemMovement, PartyMovement, StatusRow, StockLevel, WarehouseReport,
};

fn index_by_id(ops: &[OperationRecord]) -> HashMap<OperationId, &OperationRecord> {
    ops.iter().map(|op| (op.id, op)).collect()
}

/// Warehouse the record moves stock at. Returns resolve through their
/// original operation; transfers are handled by the callers that need both
/// legs.
fn anchor_warehouse(
    record: &OperationRecord,
    index: &HashMap<OperationId, &OperationRecord>,
) -> Option<WarehouseId> {
    match &record.body {
        OperationBody::Supply(b) => Some(b.warehouse),
        OperationBody::Export(b) => Some(b.warehouse),
        OperationBody::Damage(b) => Some(b.warehouse),
        OperationBody::ReturnSupply(b)
        | OperationBody::ReturnExport(b) => {
            anchor_warehouse(index.get(&b.original_operation)?, index)
        }
        OperationBody::ModifySupply(b) | OperationBody::ModifyExport(b) => {
            anchor_warehouse(index.get(&b.original_operation)?, index)
        }
        OperationBody::Transfer(_) => None,
    }
}

/// All Supply/Export/Return/Damage records for one warehouse, bucketed by
/// kind, optionally windowed on `operation_date`.
pub fn warehouse_report(
    ops: &[OperationRecord],
    warehouse: WarehouseId,
    range: DateRange,
) -> WarehouseReport {
    let index = index_by_id(ops);
    let mut report = WarehouseReport::default();

    for op in ops {
        if !range.contains(op.operation_date) {
            continue;
        }
        if anchor_warehouse(op, &index) != Some(warehouse) {
            continue;
        }

        match op.kind() {
            OperationKind::Supply => report.supplies.push(op.clone()),
            OperationKind::Export => report.exports.push(op.clone()),
            OperationKind::ReturnSupply => report.return_supplies.push(op.clone()),
            OperationKind::ReturnExport => report.return_exports.push(op.clone()),
            OperationKind::Damage => report.damages.push(op.clone()),
            _ => {}
        }
    }

    report
}

/// Cross-warehouse movement history for one item, signed per warehouse.
///
/// Supply/Export/Damage lines contribute their (post-modification) quantity;
/// returns contribute their returned quantity with the inverse sign of the
/// original. Modification records contribute nothing on their own since the
/// original line already carries the replaced quantity.
pub fn item_report(ops: &[OperationRecord], item: ItemId, range: DateRange) -> Vec<ItemMovement> {
    let index = index_by_id(ops);
    let mut movements = Vec::new();

    let mut push = |op: &OperationRecord, warehouse, quantity| {
        movements.push(ItemMovement {
            operation: op.id,
            kind: op.kind(),
            operation_date: op.operation_date,
            warehouse,
            item,
            quantity,
        });
    };

    for op in ops {
        if !range.contains(op.operation_date) {
            continue;
        }

        match &op.body {
            OperationBody::Supply(b) => {
                if let Some(line) = b.lines.iter().find(|l| l.item == item) {
                    push(op, b.warehouse, line.quantity.value());
                }
            }
            OperationBody::Export(b) => {
                if let Some(line) = b.lines.iter().find(|l| l.item == item) {
                    push(op, b.warehouse, -line.quantity.value());
                }
            }
            OperationBody::Damage(b) => {
                if let Some(line) = b.lines.iter().find(|l| l.item == item) {
                    push(op, b.warehouse, -line.quantity.value());
                }
            }
            OperationBody::Transfer(b) => {
                if let Some(line) = b.lines.iter().find(|l| l.item == item) {
                    push(op, b.from_warehouse, -line.quantity.value());
                    push(op, b.to_warehouse, line.quantity.value());
                }
            }
            OperationBody::ReturnSupply(b) => {
                if let Some(line) = b.lines.iter().find(|l| l.item == item) {
                    if let Some(warehouse) = index
                        .get(&b.original_operation)
                        .and_then(|orig| anchor_warehouse(orig, &index))
                    {
                        push(op, warehouse, -line.returned_quantity.value());
                    }
                }
            }
            OperationBody::ReturnExport(b) => {
                if let Some(line) = b.lines.iter().find(|l| l.item == item) {
                    if let Some(warehouse) = index
                        .get(&b.original_operation)
                        .and_then(|orig| anchor_warehouse(orig, &index))
                    {
                        push(op, warehouse, line.returned_quantity.value());
                    }
                }
            }
            OperationBody::ModifySupply(_) | OperationBody::ModifyExport(_) => {}
        }
    }

    movements
}

/// Current stock snapshot for one item across warehouses.
pub fn item_status(balances: &[StockBalance], item: ItemId) -> Vec<StockBalance> {
    balances
        .iter()
        .filter(|b| b.item == item)
        .cloned()
        .collect()
}

/// Current balance snapshot, flagged by stock level, optionally filtered to
/// one warehouse.
pub fn warehouse_status(
    balances: &[StockBalance],
    warehouse: Option<WarehouseId>,
) -> Vec<StatusRow> {
    balances
        .iter()
        .filter(|b| warehouse.is_none_or(|w| b.warehouse == w))
        .map(|b| StatusRow {
            level: StockLevel::classify(b.current_quantity, b.opening_balance),
            balance: b.clone(),
        })
        .collect()
}

/// Supply movements attributed to one supplier (effective line amounts).
pub fn supplier_report(
    ops: &[OperationRecord],
    supplier: SupplierId,
    range: DateRange,
) -> Vec<PartyMovement> {
    let mut movements = Vec::new();
    for op in ops {
        if !range.contains(op.operation_date) {
            continue;
        }
        if let OperationBody::Supply(b) = &op.body {
            if b.supplier != supplier {
                continue;
            }
            for line in &b.lines {
                movements.push(PartyMovement {
                    operation: op.id,
                    kind: op.kind(),
                    operation_date: op.operation_date,
                    warehouse: b.warehouse,
                    item: line.item,
                    quantity: line.effective_quantity(),
                });
            }
        }
    }
    movements
}

/// Export movements attributed to one beneficiary (effective line amounts).
pub fn beneficiary_report(
    ops: &[OperationRecord],
    beneficiary: BeneficiaryId,
    range: DateRange,
) -> Vec<PartyMovement> {
    let mut movements = Vec::new();
    for op in ops {
        if !range.contains(op.operation_date) {
            continue;
        }
        if let OperationBody::Export(b) = &op.body {
            if b.beneficiary != beneficiary {
                continue;
            }
            for line in &b.lines {
                movements.push(PartyMovement {
                    operation: op.id,
                    kind: op.kind(),
                    operation_date: op.operation_date,
                    warehouse: b.warehouse,
                    item: line.item,
                    quantity: line.effective_quantity(),
                });
            }
        }
    }
    movements
}

/// Supply movements tagged with one station.
pub fn station_report(
    ops: &[OperationRecord],
    station: StationId,
    range: DateRange,
) -> Vec<PartyMovement> {
    let mut movements = Vec::new();
    for op in ops {
        if !range.contains(op.operation_date) {
            continue;
        }
        if let OperationBody::Supply(b) = &op.body {
            if b.station != Some(station) {
                continue;
            }
            for line in &b.lines {
                movements.push(PartyMovement {
                    operation: op.id,
                    kind: op.kind(),
                    operation_date: op.operation_date,
                    warehouse: b.warehouse,
                    item: line.item,
                    quantity: line.effective_quantity(),
                });
            }
        }
    }
    movements
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fueldepot_core::Quantity;
    use fueldepot_operations::{
        ExportBody, OperationLine, ReturnBody, ReturnLine, SupplyBody, TransferBody,
    };
    use rust_decimal::Decimal;

    fn qty(n: i64) -> Quantity {
        Quantity::new(Decimal::from(n)).unwrap()
    }

    fn record(body: OperationBody) -> OperationRecord {
        OperationRecord {
            id: OperationId::new(),
            operation_date: Utc::now(),
            paper_ref_number: None,
            statement: None,
            description: None,
            attachments: vec![],
            recorded_at: Utc::now(),
            body,
        }
    }

    fn supply(warehouse: WarehouseId, supplier: SupplierId, item: ItemId, n: i64) -> OperationRecord {
        record(OperationBody::Supply(SupplyBody {
            warehouse,
            supplier,
            station: None,
            supply_bon_number: None,
            deliverer_name: None,
            deliverer_job_number: None,
            lines: vec![OperationLine::new(item, qty(n))],
        }))
    }

    fn export(
        warehouse: WarehouseId,
        beneficiary: BeneficiaryId,
        item: ItemId,
        n: i64,
    ) -> OperationRecord {
        record(OperationBody::Export(ExportBody {
            warehouse,
            beneficiary,
            recipient_name: "recipient".into(),
            recipient_job_number: None,
            lines: vec![OperationLine::new(item, qty(n))],
        }))
    }

    #[test]
    fn warehouse_report_buckets_by_kind_and_anchors_returns() {
        let warehouse = WarehouseId::new();
        let other = WarehouseId::new();
        let item = ItemId::new();
        let supplier = SupplierId::new();
        let beneficiary = BeneficiaryId::new();

        let sup = supply(warehouse, supplier, item, 100);
        let exp = export(warehouse, beneficiary, item, 40);
        let ret = record(OperationBody::ReturnExport(ReturnBody {
            original_operation: exp.id,
            lines: vec![ReturnLine {
                item,
                returned_quantity: qty(10),
            }],
        }));
        let elsewhere = supply(other, supplier, item, 5);

        let ops = vec![sup, exp, ret, elsewhere];
        let report = warehouse_report(&ops, warehouse, DateRange::default());

        assert_eq!(report.supplies.len(), 1);
        assert_eq!(report.exports.len(), 1);
        assert_eq!(report.return_exports.len(), 1);
        assert!(report.return_supplies.is_empty());
        assert!(report.damages.is_empty());
    }

    #[test]
    fn item_report_sums_to_net_movement() {
        let warehouse = WarehouseId::new();
        let item = ItemId::new();
        let supplier = SupplierId::new();
        let beneficiary = BeneficiaryId::new();

        let sup = supply(warehouse, supplier, item, 100);
        let mut exp = export(warehouse, beneficiary, item, 40);
        // Book the 10-unit return on the export line, as the engine would.
        if let OperationBody::Export(b) = &mut exp.body {
            b.lines[0].record_return(qty(10)).unwrap();
        }
        let ret = record(OperationBody::ReturnExport(ReturnBody {
            original_operation: exp.id,
            lines: vec![ReturnLine {
                item,
                returned_quantity: qty(10),
            }],
        }));

        let ops = vec![sup, exp, ret];
        let movements = item_report(&ops, item, DateRange::default());

        let net: Decimal = movements.iter().map(|m| m.quantity).sum();
        assert_eq!(net, Decimal::from(70));
    }

    #[test]
    fn transfer_produces_one_row_per_leg() {
        let from = WarehouseId::new();
        let to = WarehouseId::new();
        let item = ItemId::new();

        let ops = vec![record(OperationBody::Transfer(TransferBody {
            from_warehouse: from,
            to_warehouse: to,
            deliverer_name: None,
            deliverer_job_number: None,
            lines: vec![OperationLine::new(item, qty(30))],
        }))];

        let movements = item_report(&ops, item, DateRange::default());
        assert_eq!(movements.len(), 2);

        let net: Decimal = movements.iter().map(|m| m.quantity).sum();
        assert_eq!(net, Decimal::ZERO);

        let out = movements.iter().find(|m| m.warehouse == from).unwrap();
        assert_eq!(out.quantity, Decimal::from(-30));
    }

    #[test]
    fn date_range_filters_movements() {
        let warehouse = WarehouseId::new();
        let item = ItemId::new();
        let supplier = SupplierId::new();

        let mut old = supply(warehouse, supplier, item, 10);
        old.operation_date = Utc::now() - chrono::Duration::days(30);
        let recent = supply(warehouse, supplier, item, 20);

        let ops = vec![old, recent];
        let range = DateRange {
            start: Some(Utc::now() - chrono::Duration::days(7)),
            end: None,
        };

        let movements = item_report(&ops, item, range);
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].quantity, Decimal::from(20));
    }

    #[test]
    fn party_reports_show_effective_amounts() {
        let warehouse = WarehouseId::new();
        let item = ItemId::new();
        let beneficiary = BeneficiaryId::new();

        let mut exp = export(warehouse, beneficiary, item, 40);
        if let OperationBody::Export(b) = &mut exp.body {
            b.lines[0].record_return(qty(10)).unwrap();
        }

        let ops = vec![exp];
        let movements = beneficiary_report(&ops, beneficiary, DateRange::default());
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].quantity, qty(30));

        assert!(beneficiary_report(&ops, BeneficiaryId::new(), DateRange::default()).is_empty());
    }

    #[test]
    fn warehouse_status_flags_levels() {
        let warehouse = WarehouseId::new();
        let mut balance = StockBalance::new(
            warehouse,
            ItemId::new(),
            qty(100),
            fueldepot_core::UnitOfMeasure::Liters,
            Utc::now(),
        );
        balance.apply_delta(Decimal::from(-90), Utc::now()).unwrap();

        let rows = warehouse_status(&[balance.clone()], Some(warehouse));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].level, StockLevel::Critical);

        assert!(warehouse_status(&[balance], Some(WarehouseId::new())).is_empty());
    }
}
