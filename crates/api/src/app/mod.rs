//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the service handles shared with every handler
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response encoding and computed links
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the router for `services`.
///
/// Routes are mounted under the same prefix the link builder was given.
pub fn build_app(services: AppServices) -> Router {
    let prefix = services.links.prefix().to_string();
    let routes = routes::router().layer(Extension(Arc::new(services)));

    if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&prefix, routes)
    }
}
