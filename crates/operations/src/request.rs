//! Validated request payloads, one per operation kind.
//!
//! Each request is the fully-typed form of what the HTTP boundary accepts.
//! `validate()` performs shape checks only (presence, positivity, duplicate
//! lines); reference resolution and stock sufficiency belong to the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fueldepot_core::{
    AttachmentId, BeneficiaryId, FieldErrors, ItemId, LedgerResult, LineId, OperationId,
    StationId, SupplierId, WarehouseId,
};

/// Paper-trail fields common to every operation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDetails {
    pub operation_date: DateTime<Utc>,
    pub paper_ref_number: Option<String>,
    pub statement: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentId>,
}

impl OperationDetails {
    pub fn on(operation_date: DateTime<Utc>) -> Self {
        Self {
            operation_date,
            paper_ref_number: None,
            statement: None,
            description: None,
            attachments: vec![],
        }
    }
}

/// One requested `(item, quantity)` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub item: ItemId,
    pub quantity: Decimal,
}

/// One requested return line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLineRequest {
    pub item: ItemId,
    pub returned_quantity: Decimal,
}

fn check_lines(errors: &mut FieldErrors, lines: &[(ItemId, Decimal)]) {
    if lines.is_empty() {
        errors.push("lines", "at least one line is required");
        return;
    }

    for (idx, (_, quantity)) in lines.iter().enumerate() {
        if *quantity <= Decimal::ZERO {
            errors.push(format!("lines[{idx}].quantity"), "must be positive");
        }
    }

    // One line per item per operation.
    for (idx, (item, _)) in lines.iter().enumerate() {
        if lines[..idx].iter().any(|(seen, _)| seen == item) {
            errors.push(format!("lines[{idx}].item"), "duplicate item in lines");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyRequest {
    pub warehouse: WarehouseId,
    pub supplier: SupplierId,
    pub station: Option<StationId>,
    pub supply_bon_number: Option<String>,
    pub deliverer_name: Option<String>,
    pub deliverer_job_number: Option<String>,
    pub details: OperationDetails,
    pub lines: Vec<LineRequest>,
}

impl SupplyRequest {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errors = FieldErrors::new();
        check_lines(
            &mut errors,
            &self
                .lines
                .iter()
                .map(|l| (l.item, l.quantity))
                .collect::<Vec<_>>(),
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub warehouse: WarehouseId,
    pub beneficiary: BeneficiaryId,
    pub recipient_name: String,
    pub recipient_job_number: Option<String>,
    pub details: OperationDetails,
    pub lines: Vec<LineRequest>,
}

impl ExportRequest {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errors = FieldErrors::new();
        if self.recipient_name.trim().is_empty() {
            errors.push("recipient_name", "must not be empty");
        }
        check_lines(
            &mut errors,
            &self
                .lines
                .iter()
                .map(|l| (l.item, l.quantity))
                .collect::<Vec<_>>(),
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_warehouse: WarehouseId,
    pub to_warehouse: WarehouseId,
    pub deliverer_name: Option<String>,
    pub deliverer_job_number: Option<String>,
    pub details: OperationDetails,
    pub lines: Vec<LineRequest>,
}

impl TransferRequest {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errors = FieldErrors::new();
        if self.from_warehouse == self.to_warehouse {
            errors.push("to_warehouse", "must differ from from_warehouse");
        }
        check_lines(
            &mut errors,
            &self
                .lines
                .iter()
                .map(|l| (l.item, l.quantity))
                .collect::<Vec<_>>(),
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRequest {
    pub warehouse: WarehouseId,
    pub reason: String,
    pub details: OperationDetails,
    pub lines: Vec<LineRequest>,
}

impl DamageRequest {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errors = FieldErrors::new();
        if self.reason.trim().is_empty() {
            errors.push("reason", "must not be empty");
        }
        check_lines(
            &mut errors,
            &self
                .lines
                .iter()
                .map(|l| (l.item, l.quantity))
                .collect::<Vec<_>>(),
        );
        errors.into_result()
    }
}

/// Return of a prior Supply (`ReturnSupply`) or Export (`ReturnExport`);
/// which of the two is meant is carried by the engine entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub original_operation: OperationId,
    pub details: OperationDetails,
    pub lines: Vec<ReturnLineRequest>,
}

impl ReturnRequest {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errors = FieldErrors::new();
        check_lines(
            &mut errors,
            &self
                .lines
                .iter()
                .map(|l| (l.item, l.returned_quantity))
                .collect::<Vec<_>>(),
        );
        errors.into_result()
    }
}

/// Quantity replacement on one line of a prior Supply or Export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyRequest {
    pub original_operation: OperationId,
    pub original_line: LineId,
    pub old_quantity: Decimal,
    pub new_quantity: Decimal,
    pub reason: String,
    pub details: OperationDetails,
}

impl ModifyRequest {
    pub fn validate(&self) -> LedgerResult<()> {
        let mut errors = FieldErrors::new();
        if self.new_quantity <= Decimal::ZERO {
            errors.push("new_quantity", "must be positive");
        }
        if self.old_quantity < Decimal::ZERO {
            errors.push("old_quantity", "must not be negative");
        }
        if self.reason.trim().is_empty() {
            errors.push("reason", "must not be empty");
        }
        errors.into_result()
    }
}
