//! Supplier/beneficiary/station routes.
//!
//! The three party kinds expose the same verb set over their own paths and
//! id types, so the handler set is generated once per kind.

use axum::Router;

macro_rules! party_routes {
    ($mod_name:ident, $entity:ident, $id:ident, $insert:ident, $fetch:ident, $list:ident, $set_active:ident, $label:literal) => {
        mod $mod_name {
            use std::sync::Arc;

            use axum::{
                Json, Router,
                extract::{Extension, Path},
                http::StatusCode,
                response::IntoResponse,
                routing::{get, post},
            };

            use fueldepot_catalog::$entity;
            use fueldepot_core::$id;
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

            fn parse_id(id: &str) -> Result<$id, axum::response::Response> {
                id.parse().map_err(|_| {
                    errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "invalid_id",
                        concat!("invalid ", $label, " id"),
                    )
                })
            }

            pub async fn create(
                Extension(services): Extension<Arc<AppServices>>,
                Json(body): Json<dto::CreatePartyRequest>,
            ) -> axum::response::Response {
                let party = match $entity::new($id::new(), body.name, body.phone) {
                    Ok(p) => p,
                    Err(e) => return errors::ledger_error_to_response(e),
                };

                if let Err(e) = services.catalog.$insert(party.clone()) {
                    return errors::ledger_error_to_response(e);
                }

                (StatusCode::CREATED, Json(party)).into_response()
            }

            pub async fn list(
                Extension(services): Extension<Arc<AppServices>>,
            ) -> axum::response::Response {
                (StatusCode::OK, Json(services.catalog.$list())).into_response()
            }

            pub async fn get_one(
                Extension(services): Extension<Arc<AppServices>>,
                Path(id): Path<String>,
            ) -> axum::response::Response {
                let id = match parse_id(&id) {
                    Ok(id) => id,
                    Err(resp) => return resp,
                };

                match services.catalog.$fetch(id) {
                    Some(p) => (StatusCode::OK, Json(p)).into_response(),
                    None => errors::json_error(
                        StatusCode::NOT_FOUND,
                        "not_found",
                        concat!($label, " not found"),
                    ),
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

                match services.catalog.$set_active(id, active) {
                    Ok(p) => (StatusCode::OK, Json(p)).into_response(),
                    Err(e) => errors::ledger_error_to_response(e),
                }
            }
        }
    };
}

party_routes!(
    supplier_routes,
    Supplier,
    SupplierId,
    insert_supplier,
    supplier,
    suppliers,
    set_supplier_active,
    "supplier"
);
party_routes!(
    beneficiary_routes,
    Beneficiary,
    BeneficiaryId,
    insert_beneficiary,
    beneficiary,
    beneficiaries,
    set_beneficiary_active,
    "beneficiary"
);
party_routes!(
    station_routes,
    Station,
    StationId,
    insert_station,
    station,
    stations,
    set_station_active,
    "station"
);

pub fn suppliers_router() -> Router {
    supplier_routes::router()
}

pub fn beneficiaries_router() -> Router {
    beneficiary_routes::router()
}

pub fn stations_router() -> Router {
    station_routes::router()
}
