use axum::{Router, routing::get};

pub mod modules;
pub mod notifications;
pub mod projects;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/projects", projects::router())
        .nest("/notifications", notifications::router())
        .nest("/users", users::router())
}
