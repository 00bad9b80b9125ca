use std::sync::Arc;

use axum::{Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::get};

use projtrack_infra::UserDirectory;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_users))
}

/// Directory listing for the admin's owner picker.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if !principal.principal().is_admin() {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "admin role required");
    }
    match services.directory().list().await {
        Ok(entries) => Json(
            entries
                .iter()
                .map(dto::directory_entry_to_json)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
