//! Application builder: wires router, middleware and state into an Axum app.

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::{logging, transaction};
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
///
/// Layer order, outermost first: CORS, tracing, request logging, then the
/// transaction coordinator, so the gate and every handler see an open
/// transaction.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(&state)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            transaction::coordinate,
        ))
        .layer(axum_middleware::from_fn(logging::request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
