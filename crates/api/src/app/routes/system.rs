use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::RequestContext;

pub async fn health() -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

pub async fn whoami(Extension(ctx): Extension<RequestContext>) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "authenticated": true,
            "credential_len": ctx.credential().len(),
        })),
    )
        .into_response()
}
