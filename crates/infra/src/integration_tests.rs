//! Engine-level tests: full operation pipelines over in-memory stores.

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use fueldepot_catalog::{Beneficiary, Item, Station, Supplier, Warehouse};
use fueldepot_core::{
    BeneficiaryId, ItemId, LedgerError, OperationId, Quantity, StationId, SupplierId,
    UnitOfMeasure, WarehouseId,
};
use fueldepot_events::{EventBus, InMemoryEventBus};
use fueldepot_ledger::StockEvent;
use fueldepot_operations::{
    DamageRequest, ExportRequest, LineRequest, ModifyRequest, OperationDetails,
    ReturnLineRequest, ReturnRequest, SupplyRequest, TransferRequest,
};
use fueldepot_reports::{DateRange, item_report};

use crate::catalog_store::{CatalogStore, InMemoryCatalog};
use crate::engine::OperationEngine;
use crate::operation_store::{InMemoryOperationStore, OperationStore};
use crate::stock_store::{InMemoryStockStore, StockStore};

type TestEngine = OperationEngine<
    Arc<InMemoryCatalog>,
    Arc<InMemoryStockStore>,
    Arc<InMemoryOperationStore>,
    Arc<InMemoryEventBus<StockEvent>>,
>;

struct Harness {
    catalog: Arc<InMemoryCatalog>,
    stock: Arc<InMemoryStockStore>,
    history: Arc<InMemoryOperationStore>,
    bus: Arc<InMemoryEventBus<StockEvent>>,
    engine: TestEngine,
    warehouse: WarehouseId,
    other_warehouse: WarehouseId,
    item: ItemId,
    supplier: SupplierId,
    beneficiary: BeneficiaryId,
    station: StationId,
}

fn harness() -> Harness {
    let catalog = Arc::new(InMemoryCatalog::new());
    let stock = Arc::new(InMemoryStockStore::new());
    let history = Arc::new(InMemoryOperationStore::new());
    let bus = Arc::new(InMemoryEventBus::new());

    let warehouse = WarehouseId::new();
    let other_warehouse = WarehouseId::new();
    let item = ItemId::new();
    let supplier = SupplierId::new();
    let beneficiary = BeneficiaryId::new();
    let station = StationId::new();

    catalog
        .insert_warehouse(
            Warehouse::new(warehouse, "Main Depot", "main", "keeper", None, None).unwrap(),
        )
        .unwrap();
    catalog
        .insert_warehouse(
            Warehouse::new(
                other_warehouse,
                "North Depot",
                "branch",
                "keeper",
                None,
                Some(warehouse),
            )
            .unwrap(),
        )
        .unwrap();
    catalog
        .insert_item(Item::new(item, "Diesel").unwrap())
        .unwrap();
    catalog
        .insert_supplier(Supplier::new(supplier, "Acme Fuels", None).unwrap())
        .unwrap();
    catalog
        .insert_beneficiary(Beneficiary::new(beneficiary, "City Transit", None).unwrap())
        .unwrap();
    catalog
        .insert_station(Station::new(station, "Station 4", None).unwrap())
        .unwrap();

    let engine = OperationEngine::new(
        catalog.clone(),
        stock.clone(),
        history.clone(),
        bus.clone(),
    );

    Harness {
        catalog,
        stock,
        history,
        bus,
        engine,
        warehouse,
        other_warehouse,
        item,
        supplier,
        beneficiary,
        station,
    }
}

fn qty(n: i64) -> Quantity {
    Quantity::new(Decimal::from(n)).unwrap()
}

fn details() -> OperationDetails {
    OperationDetails::on(Utc::now())
}

impl Harness {
    fn open_balance(&self, warehouse: WarehouseId, opening: i64) {
        self.engine
            .create_balance(warehouse, self.item, Decimal::from(opening), UnitOfMeasure::Liters)
            .unwrap();
    }

    fn supply_req(&self, warehouse: WarehouseId, quantity: i64) -> SupplyRequest {
        SupplyRequest {
            warehouse,
            supplier: self.supplier,
            station: Some(self.station),
            supply_bon_number: None,
            deliverer_name: None,
            deliverer_job_number: None,
            details: details(),
            lines: vec![LineRequest {
                item: self.item,
                quantity: Decimal::from(quantity),
            }],
        }
    }

    fn export_req(&self, warehouse: WarehouseId, quantity: i64) -> ExportRequest {
        ExportRequest {
            warehouse,
            beneficiary: self.beneficiary,
            recipient_name: "Driver".into(),
            recipient_job_number: None,
            details: details(),
            lines: vec![LineRequest {
                item: self.item,
                quantity: Decimal::from(quantity),
            }],
        }
    }

    fn return_req(&self, original: OperationId, quantity: i64) -> ReturnRequest {
        ReturnRequest {
            original_operation: original,
            details: details(),
            lines: vec![ReturnLineRequest {
                item: self.item,
                returned_quantity: Decimal::from(quantity),
            }],
        }
    }

    fn current(&self, warehouse: WarehouseId) -> Quantity {
        self.stock.get(warehouse, self.item).unwrap().current_quantity
    }
}

#[test]
fn supply_export_return_scenario() {
    let h = harness();
    h.open_balance(h.warehouse, 0);

    h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();
    assert_eq!(h.current(h.warehouse), qty(100));

    let export = h.engine.export(h.export_req(h.warehouse, 40)).unwrap();
    assert_eq!(h.current(h.warehouse), qty(60));

    h.engine.return_export(h.return_req(export.id, 10)).unwrap();
    assert_eq!(h.current(h.warehouse), qty(70));

    let stored = h.history.get(export.id).unwrap();
    let line = stored.line_for_item(h.item).unwrap();
    assert_eq!(line.effective_quantity(), qty(30));
    assert_eq!(line.returned_quantity, qty(10));
}

#[test]
fn export_exceeding_stock_is_rejected_unchanged() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    h.engine.supply(h.supply_req(h.warehouse, 30)).unwrap();

    let err = h.engine.export(h.export_req(h.warehouse, 31)).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientStock(_)));
    assert_eq!(h.current(h.warehouse), qty(30));
    assert_eq!(h.history.list().len(), 1);
}

#[test]
fn transfer_is_atomic_in_success_and_failure() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    h.open_balance(h.other_warehouse, 0);
    h.engine.supply(h.supply_req(h.warehouse, 50)).unwrap();

    let transfer = TransferRequest {
        from_warehouse: h.warehouse,
        to_warehouse: h.other_warehouse,
        deliverer_name: None,
        deliverer_job_number: None,
        details: details(),
        lines: vec![LineRequest {
            item: h.item,
            quantity: Decimal::from(20),
        }],
    };
    h.engine.transfer(transfer.clone()).unwrap();
    assert_eq!(h.current(h.warehouse), qty(30));
    assert_eq!(h.current(h.other_warehouse), qty(20));

    // Debit leg cannot cover the request: both balances stay put.
    let mut too_big = transfer;
    too_big.lines[0].quantity = Decimal::from(31);
    let err = h.engine.transfer(too_big).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientStock(_)));
    assert_eq!(h.current(h.warehouse), qty(30));
    assert_eq!(h.current(h.other_warehouse), qty(20));
}

#[test]
fn transfer_to_missing_balance_row_fails_whole() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    h.engine.supply(h.supply_req(h.warehouse, 50)).unwrap();

    // No balance row at the destination.
    let err = h
        .engine
        .transfer(TransferRequest {
            from_warehouse: h.warehouse,
            to_warehouse: h.other_warehouse,
            deliverer_name: None,
            deliverer_job_number: None,
            details: details(),
            lines: vec![LineRequest {
                item: h.item,
                quantity: Decimal::from(10),
            }],
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
    assert_eq!(h.current(h.warehouse), qty(50));
}

#[test]
fn cumulative_returns_are_bounded() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();

    h.engine.return_supply(h.return_req(supply.id, 60)).unwrap();
    assert_eq!(h.current(h.warehouse), qty(40));

    // 60 already returned; only 40 outstanding.
    let err = h
        .engine
        .return_supply(h.return_req(supply.id, 41))
        .unwrap_err();
    assert!(matches!(err, LedgerError::OverReturn(_)));
    assert_eq!(h.current(h.warehouse), qty(40));

    h.engine.return_supply(h.return_req(supply.id, 40)).unwrap();
    assert_eq!(h.current(h.warehouse), qty(0));
}

#[test]
fn return_kind_must_match_original() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 10)).unwrap();

    let err = h
        .engine
        .return_export(h.return_req(supply.id, 5))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let err = h
        .engine
        .return_supply(h.return_req(OperationId::new(), 5))
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[test]
fn return_of_unlisted_item_is_flagged() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 10)).unwrap();

    let other_item = ItemId::new();
    let err = h
        .engine
        .return_supply(ReturnRequest {
            original_operation: supply.id,
            details: details(),
            lines: vec![ReturnLineRequest {
                item: other_item,
                returned_quantity: Decimal::from(1),
            }],
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn stale_modification_is_rejected_unchanged() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();
    let line = supply.line_for_item(h.item).unwrap().clone();

    let err = h
        .engine
        .modify_supply(ModifyRequest {
            original_operation: supply.id,
            original_line: line.id,
            old_quantity: Decimal::from(90),
            new_quantity: Decimal::from(120),
            reason: "recount".into(),
            details: details(),
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::StaleModification(_)));
    assert_eq!(h.current(h.warehouse), qty(100));
}

#[test]
fn modify_supply_applies_the_delta() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();
    let line = supply.line_for_item(h.item).unwrap().clone();

    h.engine
        .modify_supply(ModifyRequest {
            original_operation: supply.id,
            original_line: line.id,
            old_quantity: Decimal::from(100),
            new_quantity: Decimal::from(120),
            reason: "recount".into(),
            details: details(),
        })
        .unwrap();
    assert_eq!(h.current(h.warehouse), qty(120));

    let stored = h.history.get(supply.id).unwrap();
    assert_eq!(stored.line(line.id).unwrap().effective_quantity(), qty(120));
}

#[test]
fn modify_supply_cannot_drive_stock_negative() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();
    let line = supply.line_for_item(h.item).unwrap().clone();
    h.engine.export(h.export_req(h.warehouse, 80)).unwrap();

    // Current stock is 20; shrinking the supply line by 50 cannot apply.
    let err = h
        .engine
        .modify_supply(ModifyRequest {
            original_operation: supply.id,
            original_line: line.id,
            old_quantity: Decimal::from(100),
            new_quantity: Decimal::from(50),
            reason: "recount".into(),
            details: details(),
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientStock(_)));
    assert_eq!(h.current(h.warehouse), qty(20));
}

#[test]
fn returned_line_excludes_modification_and_vice_versa() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();
    let line = supply.line_for_item(h.item).unwrap().clone();

    h.engine.return_supply(h.return_req(supply.id, 10)).unwrap();

    let err = h
        .engine
        .modify_supply(ModifyRequest {
            original_operation: supply.id,
            original_line: line.id,
            old_quantity: Decimal::from(90),
            new_quantity: Decimal::from(95),
            reason: "recount".into(),
            details: details(),
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));

    // Fresh supply, modified first: returns are then refused.
    let supply2 = h.engine.supply(h.supply_req(h.warehouse, 50)).unwrap();
    let line2 = supply2.line_for_item(h.item).unwrap().clone();
    h.engine
        .modify_supply(ModifyRequest {
            original_operation: supply2.id,
            original_line: line2.id,
            old_quantity: Decimal::from(50),
            new_quantity: Decimal::from(45),
            reason: "recount".into(),
            details: details(),
        })
        .unwrap();

    let err = h
        .engine
        .return_supply(h.return_req(supply2.id, 5))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));
}

#[test]
fn modify_export_inverts_the_stock_delta() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();
    let export = h.engine.export(h.export_req(h.warehouse, 40)).unwrap();
    let line = export.line_for_item(h.item).unwrap().clone();

    // Export was really 50: ten more liters left the warehouse.
    h.engine
        .modify_export(ModifyRequest {
            original_operation: export.id,
            original_line: line.id,
            old_quantity: Decimal::from(40),
            new_quantity: Decimal::from(50),
            reason: "paper correction".into(),
            details: details(),
        })
        .unwrap();
    assert_eq!(h.current(h.warehouse), qty(50));
}

#[test]
fn delete_reverses_ledger_effect() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();
    let export = h.engine.export(h.export_req(h.warehouse, 40)).unwrap();
    assert_eq!(h.current(h.warehouse), qty(60));

    h.engine.delete_operation(export.id).unwrap();
    assert_eq!(h.current(h.warehouse), qty(100));
    assert!(h.history.get(export.id).is_none());

    h.engine.delete_operation(supply.id).unwrap();
    assert_eq!(h.current(h.warehouse), qty(0));
}

#[test]
fn delete_is_refused_while_referenced() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    let supply = h.engine.supply(h.supply_req(h.warehouse, 100)).unwrap();
    let ret = h.engine.return_supply(h.return_req(supply.id, 10)).unwrap();

    let err = h.engine.delete_operation(supply.id).unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));

    // Deleting the return first unwinds its bookkeeping and ledger effect.
    h.engine.delete_operation(ret.id).unwrap();
    assert_eq!(h.current(h.warehouse), qty(100));
    let line = h
        .history
        .get(supply.id)
        .unwrap()
        .line_for_item(h.item)
        .unwrap()
        .clone();
    assert_eq!(line.returned_quantity, Quantity::ZERO);

    h.engine.delete_operation(supply.id).unwrap();
    assert_eq!(h.current(h.warehouse), qty(0));
}

#[test]
fn inactive_references_are_rejected() {
    let h = harness();
    h.open_balance(h.warehouse, 0);
    h.catalog.set_supplier_active(h.supplier, false).unwrap();

    let err = h.engine.supply(h.supply_req(h.warehouse, 10)).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    h.catalog.set_supplier_active(h.supplier, true).unwrap();
    h.catalog.set_warehouse_active(h.warehouse, false).unwrap();
    let err = h.engine.supply(h.supply_req(h.warehouse, 10)).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn adjustments_are_announced_on_the_bus() {
    let h = harness();
    let sub = h.bus.subscribe();

    h.open_balance(h.warehouse, 0);
    h.engine.supply(h.supply_req(h.warehouse, 25)).unwrap();

    match sub.try_recv().unwrap() {
        StockEvent::BalanceCreated { warehouse, .. } => assert_eq!(warehouse, h.warehouse),
        other => panic!("expected BalanceCreated, got {other:?}"),
    }
    match sub.try_recv().unwrap() {
        StockEvent::StockLevelChanged {
            delta,
            quantity_after,
            ..
        } => {
            assert_eq!(delta, Decimal::from(25));
            assert_eq!(quantity_after, qty(25));
        }
        other => panic!("expected StockLevelChanged, got {other:?}"),
    }
}

// ---- property: non-negativity + report round-trip ------------------------

#[derive(Debug, Clone)]
enum Action {
    Supply { w: bool, q: i64 },
    Export { w: bool, q: i64 },
    Transfer { from_main: bool, q: i64 },
    Damage { w: bool, q: i64 },
    ReturnSupply { nth: usize, q: i64 },
    ReturnExport { nth: usize, q: i64 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (any::<bool>(), 1..60i64).prop_map(|(w, q)| Action::Supply { w, q }),
        (any::<bool>(), 1..60i64).prop_map(|(w, q)| Action::Export { w, q }),
        (any::<bool>(), 1..60i64).prop_map(|(from_main, q)| Action::Transfer { from_main, q }),
        (any::<bool>(), 1..60i64).prop_map(|(w, q)| Action::Damage { w, q }),
        (0..8usize, 1..60i64).prop_map(|(nth, q)| Action::ReturnSupply { nth, q }),
        (0..8usize, 1..60i64).prop_map(|(nth, q)| Action::ReturnExport { nth, q }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any accepted sequence of operations, no balance goes negative
    /// and replaying history over the opening balances reproduces every
    /// live balance.
    #[test]
    fn balances_stay_consistent_with_history(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let h = harness();
        h.open_balance(h.warehouse, 10);
        h.open_balance(h.other_warehouse, 0);

        for action in actions {
            let pick = |main: bool| if main { h.warehouse } else { h.other_warehouse };
            let result = match action {
                Action::Supply { w, q } => h.engine.supply(h.supply_req(pick(w), q)).map(|_| ()),
                Action::Export { w, q } => h.engine.export(h.export_req(pick(w), q)).map(|_| ()),
                Action::Damage { w, q } => h
                    .engine
                    .damage(DamageRequest {
                        warehouse: pick(w),
                        reason: "spill".into(),
                        details: details(),
                        lines: vec![LineRequest { item: h.item, quantity: Decimal::from(q) }],
                    })
                    .map(|_| ()),
                Action::Transfer { from_main, q } => h
                    .engine
                    .transfer(TransferRequest {
                        from_warehouse: pick(from_main),
                        to_warehouse: pick(!from_main),
                        deliverer_name: None,
                        deliverer_job_number: None,
                        details: details(),
                        lines: vec![LineRequest { item: h.item, quantity: Decimal::from(q) }],
                    })
                    .map(|_| ()),
                Action::ReturnSupply { nth, q } => {
                    let supplies = h.history.list_kind(fueldepot_operations::OperationKind::Supply);
                    if supplies.is_empty() {
                        Ok(())
                    } else {
                        let original = &supplies[nth % supplies.len()];
                        h.engine.return_supply(h.return_req(original.id, q)).map(|_| ())
                    }
                }
                Action::ReturnExport { nth, q } => {
                    let exports = h.history.list_kind(fueldepot_operations::OperationKind::Export);
                    if exports.is_empty() {
                        Ok(())
                    } else {
                        let original = &exports[nth % exports.len()];
                        h.engine.return_export(h.return_req(original.id, q)).map(|_| ())
                    }
                }
            };
            // Rejections are fine; they must simply leave state consistent.
            let _ = result;
        }

        let history = h.history.list();
        let movements = item_report(&history, h.item, DateRange::default());

        for balance in h.stock.list() {
            prop_assert!(balance.current_quantity >= Quantity::ZERO);

            let net: Decimal = movements
                .iter()
                .filter(|m| m.warehouse == balance.warehouse)
                .map(|m| m.quantity)
                .sum();
            prop_assert_eq!(
                balance.current_quantity.value(),
                balance.opening_balance.value() + net
            );
        }
    }
}
