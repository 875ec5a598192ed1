use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fueldepot_core::{
    AttachmentId, BeneficiaryId, ItemId, LineId, OperationId, Quantity, StationId, SupplierId,
    WarehouseId,
};

use crate::line::OperationLine;

/// Discriminant of an operation record, used for filtering and reporting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Supply,
    Export,
    Transfer,
    Damage,
    ReturnSupply,
    ReturnExport,
    ModifySupply,
    ModifyExport,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Supply => "supply",
            OperationKind::Export => "export",
            OperationKind::Transfer => "transfer",
            OperationKind::Damage => "damage",
            OperationKind::ReturnSupply => "return_supply",
            OperationKind::ReturnExport => "return_export",
            OperationKind::ModifySupply => "modify_supply",
            OperationKind::ModifyExport => "modify_export",
        }
    }
}

impl core::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock received from a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyBody {
    pub warehouse: WarehouseId,
    pub supplier: SupplierId,
    pub station: Option<StationId>,
    pub supply_bon_number: Option<String>,
    pub deliverer_name: Option<String>,
    pub deliverer_job_number: Option<String>,
    pub lines: Vec<OperationLine>,
}

/// Stock dispatched to a beneficiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBody {
    pub warehouse: WarehouseId,
    pub beneficiary: BeneficiaryId,
    pub recipient_name: String,
    pub recipient_job_number: Option<String>,
    pub lines: Vec<OperationLine>,
}

/// Stock moved between two warehouses as one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferBody {
    pub from_warehouse: WarehouseId,
    pub to_warehouse: WarehouseId,
    pub deliverer_name: Option<String>,
    pub deliverer_job_number: Option<String>,
    pub lines: Vec<OperationLine>,
}

/// Stock written off with a reason, no counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageBody {
    pub warehouse: WarehouseId,
    pub reason: String,
    pub lines: Vec<OperationLine>,
}

/// One returned line: the item and how much of it came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLine {
    pub item: ItemId,
    pub returned_quantity: Quantity,
}

/// Partial reversal of a prior Supply or Export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBody {
    pub original_operation: OperationId,
    pub lines: Vec<ReturnLine>,
}

/// Replacement of one original line's quantity, with audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyBody {
    pub original_operation: OperationId,
    pub original_line: LineId,
    pub item: ItemId,
    pub old_quantity: Quantity,
    pub new_quantity: Quantity,
    pub reason: String,
}

/// Tagged union over the eight operation kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationBody {
    Supply(SupplyBody),
    Export(ExportBody),
    Transfer(TransferBody),
    Damage(DamageBody),
    ReturnSupply(ReturnBody),
    ReturnExport(ReturnBody),
    ModifySupply(ModifyBody),
    ModifyExport(ModifyBody),
}

impl OperationBody {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationBody::Supply(_) => OperationKind::Supply,
            OperationBody::Export(_) => OperationKind::Export,
            OperationBody::Transfer(_) => OperationKind::Transfer,
            OperationBody::Damage(_) => OperationKind::Damage,
            OperationBody::ReturnSupply(_) => OperationKind::ReturnSupply,
            OperationBody::ReturnExport(_) => OperationKind::ReturnExport,
            OperationBody::ModifySupply(_) => OperationKind::ModifySupply,
            OperationBody::ModifyExport(_) => OperationKind::ModifyExport,
        }
    }

    /// Plain lines for the four line-carrying kinds.
    pub fn lines(&self) -> Option<&[OperationLine]> {
        match self {
            OperationBody::Supply(b) => Some(&b.lines),
            OperationBody::Export(b) => Some(&b.lines),
            OperationBody::Transfer(b) => Some(&b.lines),
            OperationBody::Damage(b) => Some(&b.lines),
            _ => None,
        }
    }

    pub fn lines_mut(&mut self) -> Option<&mut Vec<OperationLine>> {
        match self {
            OperationBody::Supply(b) => Some(&mut b.lines),
            OperationBody::Export(b) => Some(&mut b.lines),
            OperationBody::Transfer(b) => Some(&mut b.lines),
            OperationBody::Damage(b) => Some(&mut b.lines),
            _ => None,
        }
    }

    /// The original operation this record reverses or modifies, if any.
    pub fn references(&self) -> Option<OperationId> {
        match self {
            OperationBody::ReturnSupply(b) | OperationBody::ReturnExport(b) => {
                Some(b.original_operation)
            }
            OperationBody::ModifySupply(b) | OperationBody::ModifyExport(b) => {
                Some(b.original_operation)
            }
            _ => None,
        }
    }

    /// Whether this operation touches the given warehouse.
    pub fn touches_warehouse(&self, warehouse: WarehouseId) -> bool {
        match self {
            OperationBody::Supply(b) => b.warehouse == warehouse,
            OperationBody::Export(b) => b.warehouse == warehouse,
            OperationBody::Transfer(b) => {
                b.from_warehouse == warehouse || b.to_warehouse == warehouse
            }
            OperationBody::Damage(b) => b.warehouse == warehouse,
            // Returns and modifications are anchored to their original
            // operation's warehouse, resolved by the caller.
            _ => false,
        }
    }
}

/// An immutable, append-only operation record.
///
/// The paper trail (reference numbers, statement, attachments) rides along
/// unparsed; the ledger only interprets the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: OperationId,
    pub operation_date: DateTime<Utc>,
    pub paper_ref_number: Option<String>,
    pub statement: Option<String>,
    pub description: Option<String>,
    pub attachments: Vec<AttachmentId>,
    pub recorded_at: DateTime<Utc>,
    pub body: OperationBody,
}

impl OperationRecord {
    pub fn kind(&self) -> OperationKind {
        self.body.kind()
    }

    pub fn line(&self, line_id: LineId) -> Option<&OperationLine> {
        self.body.lines()?.iter().find(|l| l.id == line_id)
    }

    pub fn line_for_item(&self, item: ItemId) -> Option<&OperationLine> {
        self.body.lines()?.iter().find(|l| l.item == item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn qty(n: i64) -> Quantity {
        Quantity::new(Decimal::from(n)).unwrap()
    }

    fn supply_record() -> OperationRecord {
        OperationRecord {
            id: OperationId::new(),
            operation_date: Utc::now(),
            paper_ref_number: Some("PR-17".into()),
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
                lines: vec![OperationLine::new(ItemId::new(), qty(100))],
            }),
        }
    }

    #[test]
    fn kind_matches_body() {
        assert_eq!(supply_record().kind(), OperationKind::Supply);
    }

    #[test]
    fn finds_lines_by_id_and_item() {
        let record = supply_record();
        let line = &record.body.lines().unwrap()[0];
        assert_eq!(record.line(line.id).unwrap().id, line.id);
        assert_eq!(record.line_for_item(line.item).unwrap().id, line.id);
        assert!(record.line(LineId::new()).is_none());
    }

    #[test]
    fn transfer_touches_both_warehouses() {
        let from = WarehouseId::new();
        let to = WarehouseId::new();
        let body = OperationBody::Transfer(TransferBody {
            from_warehouse: from,
            to_warehouse: to,
            deliverer_name: None,
            deliverer_job_number: None,
            lines: vec![],
        });
        assert!(body.touches_warehouse(from));
        assert!(body.touches_warehouse(to));
        assert!(!body.touches_warehouse(WarehouseId::new()));
    }

    #[test]
    fn body_serializes_with_kind_tag() {
        let record = supply_record();
        let json = serde_json::to_value(&record.body).unwrap();
        assert_eq!(json["kind"], "supply");
    }
}
