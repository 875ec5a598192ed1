//! Parameterized read-only report endpoints.
//!
//! Reports fold over cloned snapshots of history + balances; nothing here
//! blocks writers. The `format` parameter is accepted for compatibility and
//! ignored: rendering (PDF/Excel) is a downstream concern.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

use fueldepot_core::{LedgerError, LedgerResult};
use fueldepot_infra::{OperationStore, StockStore};
use fueldepot_reports::{
    DateRange, beneficiary_report, item_report, item_status, station_report, supplier_report,
    warehouse_report,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/warehouse", get(warehouse))
        .route("/item", get(item))
        .route("/item-status", get(item_status_report))
        .route("/warehouse-status", get(warehouse_status_report))
        .route("/supplier", get(supplier))
        .route("/beneficiary", get(beneficiary))
        .route("/station", get(station))
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[allow(dead_code)]
    pub format: Option<String>,
}

impl RangeParams {
    fn to_range(&self) -> LedgerResult<DateRange> {
        let start = self
            .start_date
            .map(|d| {
                d.and_hms_opt(0, 0, 0)
                    .map(|dt| dt.and_utc())
                    .ok_or_else(|| LedgerError::validation("start_date", "invalid date"))
            })
            .transpose()?;
        let end = self
            .end_date
            .map(|d| {
                d.and_hms_opt(23, 59, 59)
                    .map(|dt| dt.and_utc())
                    .ok_or_else(|| LedgerError::validation("end_date", "invalid date"))
            })
            .transpose()?;
        Ok(DateRange { start, end })
    }
}

#[derive(Debug, Deserialize)]
pub struct WarehouseParams {
    pub warehouse_id: String,
    #[serde(flatten)]
    pub range: RangeParams,
}

pub async fn warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<WarehouseParams>,
) -> axum::response::Response {
    let warehouse_id = match params.warehouse_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warehouse id");
        }
    };
    let range = match params.range.to_range() {
        Ok(r) => r,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    let report = warehouse_report(&services.history.list(), warehouse_id, range);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "supplies": dto::operations_to_json(&report.supplies, &services),
            "exports": dto::operations_to_json(&report.exports, &services),
            "return_supplies": dto::operations_to_json(&report.return_supplies, &services),
            "return_exports": dto::operations_to_json(&report.return_exports, &services),
            "damages": dto::operations_to_json(&report.damages, &services),
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ItemParams {
    pub item_id: String,
    #[serde(flatten)]
    pub range: RangeParams,
}

pub async fn item(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<ItemParams>,
) -> axum::response::Response {
    let item_id = match params.item_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };
    let range = match params.range.to_range() {
        Ok(r) => r,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    let movements = item_report(&services.history.list(), item_id, range);
    (StatusCode::OK, Json(movements)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ItemStatusParams {
    pub item_id: String,
}

pub async fn item_status_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<ItemStatusParams>,
) -> axum::response::Response {
    let item_id = match params.item_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };

    let rows = item_status(&services.stock.list(), item_id);
    (StatusCode::OK, Json(rows)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct WarehouseStatusParams {
    pub warehouse_id: Option<String>,
}

pub async fn warehouse_status_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<WarehouseStatusParams>,
) -> axum::response::Response {
    let warehouse_id = match params.warehouse_id {
        None => None,
        Some(raw) => match raw.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid warehouse id",
                );
            }
        },
    };

    let rows = services.warehouse_status(warehouse_id);
    (StatusCode::OK, Json(rows)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SupplierParams {
    pub supplier_id: String,
    #[serde(flatten)]
    pub range: RangeParams,
}

pub async fn supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<SupplierParams>,
) -> axum::response::Response {
    let supplier_id = match params.supplier_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid supplier id");
        }
    };
    let range = match params.range.to_range() {
        Ok(r) => r,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    let movements = supplier_report(&services.history.list(), supplier_id, range);
    (StatusCode::OK, Json(movements)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct BeneficiaryParams {
    pub beneficiary_id: String,
    #[serde(flatten)]
    pub range: RangeParams,
}

pub async fn beneficiary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<BeneficiaryParams>,
) -> axum::response::Response {
    let beneficiary_id = match params.beneficiary_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid beneficiary id",
            );
        }
    };
    let range = match params.range.to_range() {
        Ok(r) => r,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    let movements = beneficiary_report(&services.history.list(), beneficiary_id, range);
    (StatusCode::OK, Json(movements)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct StationParams {
    pub stations_id: String,
    #[serde(flatten)]
    pub range: RangeParams,
}

pub async fn station(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<StationParams>,
) -> axum::response::Response {
    let station_id = match params.stations_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid station id");
        }
    };
    let range = match params.range.to_range() {
        Ok(r) => r,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    let movements = station_report(&services.history.list(), station_id, range);
    (StatusCode::OK, Json(movements)).into_response()
}
