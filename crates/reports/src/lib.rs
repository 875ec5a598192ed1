//! `fueldepot-reports` — read-only report folds.
//!
//! Every report is a pure function over snapshots of the operation history
//! and the live balances. Nothing here holds locks or maintains state, so
//! reports are reproducible at any time and trivially cancellable.

pub mod engine;
pub mod view;

pub use engine::{
    beneficiary_report, item_report, item_status, station_report, supplier_report,
    warehouse_report, warehouse_status,
};
pub use view::{DateRange, ItemMovement, PartyMovement, StatusRow, StockLevel, WarehouseReport};
