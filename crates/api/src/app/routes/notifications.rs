use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use projtrack_core::NotificationId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
}

pub async fn list_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<dto::ListNotificationsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_input",
                rejection.body_text(),
            );
        }
    };
    match services
        .inbox()
        .list(principal.principal_id(), query.limit)
        .await
    {
        Ok(list) => Json(
            list.iter()
                .map(dto::notification_to_json)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn unread_count(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.inbox().unread_count(principal.principal_id()).await {
        Ok(n) => Json(serde_json::json!({ "unread": n })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Always 204 for a well-formed id: foreign or missing ids are a silent no-op.
pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: NotificationId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid notification id");
        }
    };
    match services.inbox().mark_read(principal.principal_id(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn mark_all_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.inbox().mark_all_read(principal.principal_id()).await {
        Ok(n) => Json(serde_json::json!({ "marked": n })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
