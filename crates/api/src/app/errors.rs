use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fueldepot_core::LedgerError;

/// Map a ledger error onto a consistent HTTP error body.
///
/// Validation failures carry the field-to-message map; everything else is
/// a single descriptive message.
pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "validation_error",
                "fields": fields,
            })),
        )
            .into_response(),
        LedgerError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        LedgerError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        LedgerError::InsufficientStock(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock", msg)
        }
        LedgerError::OverReturn(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "over_return", msg)
        }
        LedgerError::StaleModification(msg) => {
            json_error(StatusCode::CONFLICT, "stale_modification", msg)
        }
        LedgerError::Internal(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
