//! HTTP route handlers.

pub mod analyze;
pub mod health;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, DATE};
use axum::http::{HeaderName, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = usize::try_from(state.config.max_request_bytes).unwrap_or(usize::MAX);

    Router::new()
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(analyze::routes())
        .merge(health::routes())
}

/// Any origin; submission, preflight and read verbs; common request headers.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS, Method::POST])
        .allow_headers([
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            ACCEPT,
            HeaderName::from_static("accept-version"),
            CONTENT_LENGTH,
            HeaderName::from_static("content-md5"),
            CONTENT_TYPE,
            DATE,
            HeaderName::from_static("x-api-version"),
        ])
}
