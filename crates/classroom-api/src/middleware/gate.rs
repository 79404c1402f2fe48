//! Route-level authorization.
//!
//! Each protected route is registered with the [`Operation`] it performs;
//! [`guard`] attaches the gate for that operation as a route layer, so the
//! handler never runs for a rejected request.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self as axum_middleware, Next};
use axum::response::Response;
use axum::routing::MethodRouter;
use tracing::warn;

use classroom_auth::{AuthorizationGate, GateError, Operation};
use classroom_core::error::AppError;

use crate::error::ApiError;
use crate::middleware::transaction::TxSlot;
use crate::state::AppState;

/// Gate bound to one operation.
#[derive(Debug, Clone)]
pub struct Guard {
    gate: Arc<AuthorizationGate>,
    operation: Operation,
}

impl Guard {
    pub fn new(state: &AppState, operation: Operation) -> Self {
        Self {
            gate: Arc::clone(&state.gate),
            operation,
        }
    }
}

/// Protect `route` with the gate for `operation`.
pub fn guard(
    state: &AppState,
    operation: Operation,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.route_layer(axum_middleware::from_fn_with_state(
        Guard::new(state, operation),
        authorize,
    ))
}

/// Run the gate, then publish the [`Principal`](classroom_auth::Principal)
/// on the request for handlers and on the response for request logging.
pub async fn authorize(
    State(guard): State<Guard>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default().to_string());
    let slot = req
        .extensions()
        .get::<TxSlot>()
        .cloned()
        .ok_or_else(|| AppError::internal("Gate mounted without a request transaction"))?;

    let principal = {
        let mut held = slot.0.lock().await;
        let tx = held
            .as_mut()
            .ok_or_else(|| AppError::transaction("Transaction already settled"))?;
        guard
            .gate
            .authorize(header.as_deref(), guard.operation, tx)
            .await
            .map_err(|err| {
                if let GateError::Denied(denied) = &err {
                    warn!(
                        operation = %guard.operation,
                        reason = denied.reason(),
                        "Access denied"
                    );
                }
                AppError::from(err)
            })?
    };

    req.extensions_mut().insert(principal.clone());
    let mut response = next.run(req).await;
    response.extensions_mut().insert(principal);
    Ok(response)
}
