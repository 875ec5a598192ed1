//! Request/response DTOs and JSON mapping helpers.
//!
//! Wire field names follow the upstream client contract (`operation_date`,
//! `items`, `returned_items`, ...); `into_domain` converts to the typed
//! engine requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use fueldepot_core::{
    AttachmentId, BeneficiaryId, ItemId, LineId, OperationId, StationId, SupplierId,
    UnitOfMeasure, WarehouseId,
};
use fueldepot_infra::CatalogStore;
use fueldepot_operations::{
    DamageRequest, ExportRequest, LineRequest, ModifyRequest, OperationBody, OperationDetails,
    OperationLine, OperationRecord, ReturnLineRequest, ReturnRequest, SupplyRequest,
    TransferRequest,
};

use crate::app::services::AppServices;

// -------------------------
// Catalog request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    pub classification: String,
    pub storekeeper: String,
    pub phone: Option<String>,
    pub parent: Option<WarehouseId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBalanceRequest {
    pub warehouse: WarehouseId,
    pub item: ItemId,
    pub opening_balance: Decimal,
    pub unit_of_measure: UnitOfMeasure,
}

// -------------------------
// Operation request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct DetailsDto {
    pub operation_date: DateTime<Utc>,
    pub paper_ref_number: Option<String>,
    pub operation_statement: Option<String>,
    pub operation_description: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentId>,
}

impl DetailsDto {
    fn into_domain(self) -> OperationDetails {
        OperationDetails {
            operation_date: self.operation_date,
            paper_ref_number: self.paper_ref_number,
            statement: self.operation_statement,
            description: self.operation_description,
            attachments: self.attachments,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LineDto {
    pub item: ItemId,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ReturnLineDto {
    pub item: ItemId,
    pub returned_quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SupplyOperationRequest {
    pub warehouse: WarehouseId,
    pub supplier: SupplierId,
    pub stations: Option<StationId>,
    pub supply_bon_number: Option<String>,
    pub deliverer_name: Option<String>,
    pub deliverer_job_number: Option<String>,
    #[serde(flatten)]
    pub details: DetailsDto,
    pub items: Vec<LineDto>,
}

impl SupplyOperationRequest {
    pub fn into_domain(self) -> SupplyRequest {
        SupplyRequest {
            warehouse: self.warehouse,
            supplier: self.supplier,
            station: self.stations,
            supply_bon_number: self.supply_bon_number,
            deliverer_name: self.deliverer_name,
            deliverer_job_number: self.deliverer_job_number,
            details: self.details.into_domain(),
            lines: self
                .items
                .into_iter()
                .map(|l| LineRequest {
                    item: l.item,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportOperationRequest {
    pub warehouse: WarehouseId,
    pub beneficiary: BeneficiaryId,
    pub recipient_name: String,
    pub recipient_job_number: Option<String>,
    #[serde(flatten)]
    pub details: DetailsDto,
    pub items: Vec<LineDto>,
}

impl ExportOperationRequest {
    pub fn into_domain(self) -> ExportRequest {
        ExportRequest {
            warehouse: self.warehouse,
            beneficiary: self.beneficiary,
            recipient_name: self.recipient_name,
            recipient_job_number: self.recipient_job_number,
            details: self.details.into_domain(),
            lines: self
                .items
                .into_iter()
                .map(|l| LineRequest {
                    item: l.item,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferOperationRequest {
    pub from_warehouse: WarehouseId,
    pub to_warehouse: WarehouseId,
    pub deliverer_name: Option<String>,
    pub deliverer_job_number: Option<String>,
    #[serde(flatten)]
    pub details: DetailsDto,
    pub items: Vec<LineDto>,
}

impl TransferOperationRequest {
    pub fn into_domain(self) -> TransferRequest {
        TransferRequest {
            from_warehouse: self.from_warehouse,
            to_warehouse: self.to_warehouse,
            deliverer_name: self.deliverer_name,
            deliverer_job_number: self.deliverer_job_number,
            details: self.details.into_domain(),
            lines: self
                .items
                .into_iter()
                .map(|l| LineRequest {
                    item: l.item,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DamageOperationRequest {
    pub warehouse: WarehouseId,
    pub reason: String,
    #[serde(flatten)]
    pub details: DetailsDto,
    pub items: Vec<LineDto>,
}

impl DamageOperationRequest {
    pub fn into_domain(self) -> DamageRequest {
        DamageRequest {
            warehouse: self.warehouse,
            reason: self.reason,
            details: self.details.into_domain(),
            lines: self
                .items
                .into_iter()
                .map(|l| LineRequest {
                    item: l.item,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReturnOperationRequest {
    pub original_operation: OperationId,
    #[serde(flatten)]
    pub details: DetailsDto,
    pub returned_items: Vec<ReturnLineDto>,
}

impl ReturnOperationRequest {
    pub fn into_domain(self) -> ReturnRequest {
        ReturnRequest {
            original_operation: self.original_operation,
            details: self.details.into_domain(),
            lines: self
                .returned_items
                .into_iter()
                .map(|l| ReturnLineRequest {
                    item: l.item,
                    returned_quantity: l.returned_quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ModifyOperationRequest {
    pub original_operation: OperationId,
    pub original_item_line: LineId,
    pub old_quantity: Decimal,
    pub new_quantity: Decimal,
    pub reason: String,
    #[serde(flatten)]
    pub details: DetailsDto,
}

impl ModifyOperationRequest {
    pub fn into_domain(self) -> ModifyRequest {
        ModifyRequest {
            original_operation: self.original_operation,
            original_line: self.original_item_line,
            old_quantity: self.old_quantity,
            new_quantity: self.new_quantity,
            reason: self.reason,
            details: self.details.into_domain(),
        }
    }
}

// -------------------------
// Response mapping
// -------------------------

fn lines_to_json(lines: &[OperationLine], services: &AppServices) -> JsonValue {
    JsonValue::Array(
        lines
            .iter()
            .map(|l| {
                json!({
                    "id": l.id,
                    "item": l.item,
                    "item_name": services.catalog.item(l.item).map(|i| i.name),
                    "quantity": l.quantity,
                    "returned_quantity": l.returned_quantity,
                    "effective_quantity": l.effective_quantity(),
                })
            })
            .collect(),
    )
}

/// Serialize an operation record with resolved display names.
pub fn operation_to_json(record: &OperationRecord, services: &AppServices) -> JsonValue {
    let mut out = json!({
        "id": record.id,
        "kind": record.kind().as_str(),
        "operation_date": record.operation_date,
        "paper_ref_number": record.paper_ref_number,
        "operation_statement": record.statement,
        "operation_description": record.description,
        "attachments": record.attachments,
        "recorded_at": record.recorded_at,
    });
    let body = match &record.body {
        OperationBody::Supply(b) => json!({
            "warehouse": b.warehouse,
            "warehouse_name": services.catalog.warehouse(b.warehouse).map(|w| w.name),
            "supplier": b.supplier,
            "supplier_name": services.catalog.supplier(b.supplier).map(|s| s.name),
            "stations": b.station,
            "stations_name": b.station.and_then(|s| services.catalog.station(s)).map(|s| s.name),
            "supply_bon_number": b.supply_bon_number,
            "deliverer_name": b.deliverer_name,
            "deliverer_job_number": b.deliverer_job_number,
            "items_details": lines_to_json(&b.lines, services),
        }),
        OperationBody::Export(b) => json!({
            "warehouse": b.warehouse,
            "warehouse_name": services.catalog.warehouse(b.warehouse).map(|w| w.name),
            "beneficiary": b.beneficiary,
            "beneficiary_name": services.catalog.beneficiary(b.beneficiary).map(|x| x.name),
            "recipient_name": b.recipient_name,
            "recipient_job_number": b.recipient_job_number,
            "items_details": lines_to_json(&b.lines, services),
        }),
        OperationBody::Transfer(b) => json!({
            "from_warehouse": b.from_warehouse,
            "from_warehouse_name": services.catalog.warehouse(b.from_warehouse).map(|w| w.name),
            "to_warehouse": b.to_warehouse,
            "to_warehouse_name": services.catalog.warehouse(b.to_warehouse).map(|w| w.name),
            "deliverer_name": b.deliverer_name,
            "deliverer_job_number": b.deliverer_job_number,
            "items_details": lines_to_json(&b.lines, services),
        }),
        OperationBody::Damage(b) => json!({
            "warehouse": b.warehouse,
            "warehouse_name": services.catalog.warehouse(b.warehouse).map(|w| w.name),
            "reason": b.reason,
            "items_details": lines_to_json(&b.lines, services),
        }),
        OperationBody::ReturnSupply(b) | OperationBody::ReturnExport(b) => json!({
            "original_operation": b.original_operation,
            "returned_items": b.lines.iter().map(|l| json!({
                "item": l.item,
                "item_name": services.catalog.item(l.item).map(|i| i.name),
                "returned_quantity": l.returned_quantity,
            })).collect::<Vec<_>>(),
        }),
        OperationBody::ModifySupply(b) | OperationBody::ModifyExport(b) => json!({
            "original_operation": b.original_operation,
            "original_item_line": b.original_line,
            "item": b.item,
            "item_name": services.catalog.item(b.item).map(|i| i.name),
            "old_quantity": b.old_quantity,
            "new_quantity": b.new_quantity,
            "reason": b.reason,
        }),
    };

    if let (Some(out_map), Some(body_map)) = (out.as_object_mut(), body.as_object()) {
        for (k, v) in body_map {
            out_map.insert(k.clone(), v.clone());
        }
    }
    out
}

pub fn operations_to_json(records: &[OperationRecord], services: &AppServices) -> JsonValue {
    JsonValue::Array(
        records
            .iter()
            .map(|r| operation_to_json(r, services))
            .collect(),
    )
}
