use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use projtrack_infra::{ServiceError, StoreError};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        ServiceError::Forbidden => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "not allowed to act on this project",
        ),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        ServiceError::Storage(msg) => {
            tracing::error!(error = %msg, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "storage failure",
            )
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    service_error_to_response(err.into())
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
