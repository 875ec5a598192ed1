use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use fueldepot_catalog::Item;
use fueldepot_core::ItemId;
use fueldepot_infra::CatalogStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one))
        .route("/:id/activate", post(activate))
        .route("/:id/deactivate", post(deactivate))
}

fn parse_id(id: &str) -> Result<ItemId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"))
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let item = match Item::new(ItemId::new(), body.name) {
        Ok(i) => i,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    if let Err(e) = services.catalog.insert_item(item.clone()) {
        return errors::ledger_error_to_response(e);
    }

    (StatusCode::CREATED, Json(item)).into_response()
}

pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    (StatusCode::OK, Json(services.catalog.items())).into_response()
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.catalog.item(id) {
        Some(i) => (StatusCode::OK, Json(i)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
    }
}

pub async fn activate(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    set_active(&services, &id, true)
}

pub async fn deactivate(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    set_active(&services, &id, false)
}

fn set_active(services: &AppServices, id: &str, active: bool) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.catalog.set_item_active(id, active) {
        Ok(i) => (StatusCode::OK, Json(i)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
