use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use fueldepot_core::{ItemId, WarehouseId};
use fueldepot_infra::StockStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/balances", post(create).get(list))
        .route("/balances/:warehouse_id/:item_id", get(get_one))
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateBalanceRequest>,
) -> axum::response::Response {
    match services.engine.create_balance(
        body.warehouse,
        body.item,
        body.opening_balance,
        body.unit_of_measure,
    ) {
        Ok(balance) => (StatusCode::CREATED, Json(balance)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    (StatusCode::OK, Json(services.stock.list())).into_response()
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Path((warehouse_id, item_id)): Path<(String, String)>,
) -> axum::response::Response {
    let warehouse: WarehouseId = match warehouse_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warehouse id");
        }
    };
    let item: ItemId = match item_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };

    match services.stock.get(warehouse, item) {
        Some(balance) => (StatusCode::OK, Json(balance)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "stock record not found"),
    }
}
