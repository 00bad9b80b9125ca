//! Module handlers, addressed by position within a project.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::routes::projects::parse_project_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// Digits-only input that overflows `usize` saturates: no project holds that
/// many modules, so the service answers with the usual `not_found`.
fn parse_index(raw: &str) -> Result<usize, axum::response::Response> {
    match raw.parse() {
        Ok(index) => Ok(index),
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => Ok(usize::MAX),
        Err(_) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "module index must be a non-negative integer",
        )),
    }
}

pub async fn add_module(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddModuleRequest>,
) -> axum::response::Response {
    let id = match parse_project_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services
        .projects
        .add_module(principal.principal(), id, &body.name)
        .await
    {
        Ok(p) => (StatusCode::CREATED, Json(dto::project_to_json(&p))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn toggle_module(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, index)): Path<(String, String)>,
) -> axum::response::Response {
    let (id, index) = match (parse_project_id(&id), parse_index(&index)) {
        (Ok(id), Ok(index)) => (id, index),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    match services
        .projects
        .toggle_module(principal.principal(), id, index)
        .await
    {
        Ok(p) => Json(dto::project_to_json(&p)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_module(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, index)): Path<(String, String)>,
) -> axum::response::Response {
    let (id, index) = match (parse_project_id(&id), parse_index(&index)) {
        (Ok(id), Ok(index)) => (id, index),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    match services
        .projects
        .delete_module(principal.principal(), id, index)
        .await
    {
        Ok(removed) => Json(serde_json::json!({
            "removed": removed.module.name,
            "project": dto::project_to_json(&removed.project),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_parsing() {
        assert_eq!(parse_index("0").unwrap(), 0);
        assert_eq!(parse_index("42").unwrap(), 42);
        assert_eq!(parse_index("99999999999999999999").unwrap(), usize::MAX);

        for bad in ["", "-1", "abc", "1.5", "+"] {
            let resp = parse_index(bad).unwrap_err();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{bad:?}");
        }
    }
}
