//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::error::ApiResult;
use crate::extractors::Tx;
use crate::state::AppState;

/// GET /api/v1/health
///
/// Runs inside the request's read-only transaction, so a store that cannot
/// open or answer one turns this red.
pub async fn health(State(state): State<AppState>, mut tx: Tx) -> ApiResult<Json<HealthResponse>> {
    tx.ping().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database: state.database.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
