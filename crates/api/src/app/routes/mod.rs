use axum::{Router, routing::get};

pub mod items;
pub mod operations;
pub mod parties;
pub mod reports;
pub mod stock;
pub mod system;
pub mod warehouses;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/catalog/warehouses", warehouses::router())
        .nest("/catalog/items", items::router())
        .nest("/catalog/suppliers", parties::suppliers_router())
        .nest("/catalog/beneficiaries", parties::beneficiaries_router())
        .nest("/catalog/stations", parties::stations_router())
        .nest("/stock", stock::router())
        .nest("/operations", operations::router())
        .nest("/reports", reports::router())
}
