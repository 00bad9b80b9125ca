use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The caller's identity plus the unread badge count.
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let unread = match services.inbox().unread_count(principal.principal_id()).await {
        Ok(n) => n,
        Err(e) => return errors::store_error_to_response(e),
    };
    let p = principal.principal();

    Json(serde_json::json!({
        "principal_id": p.id.to_string(),
        "username": p.username,
        "role": p.role.as_str(),
        "unread_notifications": unread,
    }))
    .into_response()
}
