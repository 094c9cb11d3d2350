pub mod documents;
pub mod middleware;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get};
use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

use crate::api::documents::{dispatch_handler, home_handler, not_found};
use crate::api::middleware::method_override;
use crate::utils::state::AppState;

/// Largest request body accepted, uploads included.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler).fallback(not_found))
        .route("/{*tail}", any(dispatch_handler))
        .fallback(not_found)
        .layer(axum_middleware::from_fn(method_override))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
