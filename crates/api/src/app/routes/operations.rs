//! Operation endpoints: one create/list verb pair per kind, plus shared
//! retrieve/delete on the record id.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use fueldepot_core::OperationId;
use fueldepot_infra::OperationStore;
use fueldepot_operations::OperationKind;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/supply", post(create_supply).get(list_supply))
        .route("/supply/:id", get(get_operation).delete(delete_operation))
        .route("/export", post(create_export).get(list_export))
        .route("/export/:id", get(get_operation).delete(delete_operation))
        .route("/transfer", post(create_transfer).get(list_transfer))
        .route("/transfer/:id", get(get_operation).delete(delete_operation))
        .route("/damage", post(create_damage).get(list_damage))
        .route("/damage/:id", get(get_operation).delete(delete_operation))
        .route("/return_supply", post(create_return_supply).get(list_return_supply))
        .route("/return_supply/:id", get(get_operation).delete(delete_operation))
        .route("/return_export", post(create_return_export).get(list_return_export))
        .route("/return_export/:id", get(get_operation).delete(delete_operation))
        .route("/modify_supply", post(create_modify_supply).get(list_modify_supply))
        .route("/modify_supply/:id", get(get_operation).delete(delete_operation))
        .route("/modify_export", post(create_modify_export).get(list_modify_export))
        .route("/modify_export/:id", get(get_operation).delete(delete_operation))
}

fn parse_id(id: &str) -> Result<OperationId, axum::response::Response> {
    id.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid operation id")
    })
}

fn created(
    result: Result<fueldepot_operations::OperationRecord, fueldepot_core::LedgerError>,
    services: &AppServices,
) -> axum::response::Response {
    match result {
        Ok(record) => (
            StatusCode::CREATED,
            Json(dto::operation_to_json(&record, services)),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

fn listing(kind: OperationKind, services: &AppServices) -> axum::response::Response {
    let records = services.history.list_kind(kind);
    (
        StatusCode::OK,
        Json(dto::operations_to_json(&records, services)),
    )
        .into_response()
}

pub async fn create_supply(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SupplyOperationRequest>,
) -> axum::response::Response {
    created(services.engine.supply(body.into_domain()), &services)
}

pub async fn list_supply(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    listing(OperationKind::Supply, &services)
}

pub async fn create_export(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ExportOperationRequest>,
) -> axum::response::Response {
    created(services.engine.export(body.into_domain()), &services)
}

pub async fn list_export(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    listing(OperationKind::Export, &services)
}

pub async fn create_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TransferOperationRequest>,
) -> axum::response::Response {
    created(services.engine.transfer(body.into_domain()), &services)
}

pub async fn list_transfer(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    listing(OperationKind::Transfer, &services)
}

pub async fn create_damage(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::DamageOperationRequest>,
) -> axum::response::Response {
    created(services.engine.damage(body.into_domain()), &services)
}

pub async fn list_damage(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    listing(OperationKind::Damage, &services)
}

pub async fn create_return_supply(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ReturnOperationRequest>,
) -> axum::response::Response {
    created(services.engine.return_supply(body.into_domain()), &services)
}

pub async fn list_return_supply(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    listing(OperationKind::ReturnSupply, &services)
}

pub async fn create_return_export(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ReturnOperationRequest>,
) -> axum::response::Response {
    created(services.engine.return_export(body.into_domain()), &services)
}

pub async fn list_return_export(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    listing(OperationKind::ReturnExport, &services)
}

pub async fn create_modify_supply(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ModifyOperationRequest>,
) -> axum::response::Response {
    created(services.engine.modify_supply(body.into_domain()), &services)
}

pub async fn list_modify_supply(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    listing(OperationKind::ModifySupply, &services)
}

pub async fn create_modify_export(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ModifyOperationRequest>,
) -> axum::response::Response {
    created(services.engine.modify_export(body.into_domain()), &services)
}

pub async fn list_modify_export(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    listing(OperationKind::ModifyExport, &services)
}

pub async fn get_operation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.history.get(id) {
        Some(record) => (
            StatusCode::OK,
            Json(dto::operation_to_json(&record, &services)),
        )
            .into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "operation not found"),
    }
}

/// Administrative delete: the engine re-reverses the ledger effect first.
pub async fn delete_operation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.engine.delete_operation(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
