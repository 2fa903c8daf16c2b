use axum::{Router, routing::get};

pub mod authorizations;
pub mod system;

/// Resource routes, relative to the mount prefix.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/authorizations", authorizations::router())
}
