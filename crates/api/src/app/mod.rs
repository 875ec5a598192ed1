//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/engine wiring and the report cache
//! - `routes/`: HTTP routes + handlers (one file per resource area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::context::StaticTokenValidator;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(api_token: String) -> Router {
    let auth_state = middleware::AuthState {
        validator: Arc::new(StaticTokenValidator::new(api_token)),
    };

    let services = Arc::new(services::build_services());

    // Protected routes: require a valid bearer credential.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
