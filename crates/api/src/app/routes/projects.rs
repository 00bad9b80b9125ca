use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use projtrack_core::ProjectId;

use crate::app::routes::modules;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/:id/modules", post(modules::add_module))
        .route("/:id/modules/:index/toggle", post(modules::toggle_module))
        .route("/:id/modules/:index", axum::routing::delete(modules::delete_module))
}

pub(crate) fn parse_project_id(raw: &str) -> Result<ProjectId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id"))
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.projects.list_visible(principal.principal()).await {
        Ok(list) => Json(list.iter().map(dto::project_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ProjectRequest>,
) -> axum::response::Response {
    let (input, owner) = match body.into_parts() {
        Ok(parts) => parts,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
    };

    match services
        .projects
        .create(principal.principal(), input, owner)
        .await
    {
        Ok(created) => (StatusCode::CREATED, Json(dto::created_to_json(&created))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_project_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.projects.get(principal.principal(), id).await {
        Ok(p) => Json(dto::project_to_json(&p)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ProjectRequest>,
) -> axum::response::Response {
    let id = match parse_project_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (input, owner) = match body.into_parts() {
        Ok(parts) => parts,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
    };

    match services
        .projects
        .update(principal.principal(), id, input, owner)
        .await
    {
        Ok(p) => Json(dto::project_to_json(&p)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_project_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.projects.delete(principal.principal(), id).await {
        Ok(removed) => Json(serde_json::json!({
            "deleted": removed.external_id,
            "modules_removed": removed.modules.len(),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
