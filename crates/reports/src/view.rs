//! Report view types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fueldepot_core::{ItemId, OperationId, Quantity, WarehouseId};
use fueldepot_ledger::StockBalance;
use fueldepot_operations::{OperationKind, OperationRecord};

/// Optional inclusive date window on `operation_date`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if at > end {
                return false;
            }
        }
        true
    }
}

/// Warehouse report: the warehouse's history bucketed by kind.
///
/// Return records are anchored to the warehouse of their original
/// operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseReport {
    pub supplies: Vec<OperationRecord>,
    pub exports: Vec<OperationRecord>,
    pub return_supplies: Vec<OperationRecord>,
    pub return_exports: Vec<OperationRecord>,
    pub damages: Vec<OperationRecord>,
}

/// One signed movement of an item, across warehouses.
///
/// Summing `quantity` over a `(warehouse, item)` pair on top of the opening
/// balance reproduces the live `current_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMovement {
    pub operation: OperationId,
    pub kind: OperationKind,
    pub operation_date: DateTime<Utc>,
    pub warehouse: WarehouseId,
    pub item: ItemId,
    /// Signed quantity: positive into the warehouse, negative out of it.
    pub quantity: Decimal,
}

/// One movement attributed to a counterparty (supplier/beneficiary/station).
///
/// Line amounts are effective (post-return, post-modification).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMovement {
    pub operation: OperationId,
    pub kind: OperationKind,
    pub operation_date: DateTime<Utc>,
    pub warehouse: WarehouseId,
    pub item: ItemId,
    pub quantity: Quantity,
}

/// Stock-level classification relative to the opening balance.
///
/// Presentation thresholds, computed from ledger data and never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// Below 20% of the opening balance.
    Critical,
    /// Below 50% of the opening balance.
    Low,
    Normal,
}

impl StockLevel {
    pub fn classify(current: Quantity, opening: Quantity) -> Self {
        let current = current.value();
        let opening = opening.value();

        if current < opening * Decimal::new(2, 1) {
            StockLevel::Critical
        } else if current < opening * Decimal::new(5, 1) {
            StockLevel::Low
        } else {
            StockLevel::Normal
        }
    }
}

/// One row of the warehouse-status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    #[serde(flatten)]
    pub balance: StockBalance,
    pub level: StockLevel,
}
