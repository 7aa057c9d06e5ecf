//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `state.rs`: the services shared by every handler
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON body helpers
//! - `extract.rs`: JSON extractor with API-shaped rejections
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod state;

pub use state::AppState;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: AppState) -> Router {
    // Everything except the health probe resolves the caller first.
    let api = routes::router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .layer(Extension(state));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .fallback(routes::system::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
