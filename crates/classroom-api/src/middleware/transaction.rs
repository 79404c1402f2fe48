//! Per-request transaction coordinator.
//!
//! Each request moves through `Idle -> Open -> {Committed | RolledBack}`:
//!
//! * `OPTIONS` preflights never open a transaction.
//! * `GET` and `HEAD` always roll back.
//! * Every other verb commits only when the handler returned a status below
//!   400; errors, panics and deadline expiry roll back.
//!
//! When the client disconnects the whole future is dropped and the slot's
//! [`RequestTransaction`] rolls itself back on drop, so no path leaves a
//! transaction open.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use classroom_core::error::AppError;
use classroom_database::RequestTransaction;

use crate::error::ApiError;
use crate::state::AppState;

/// Request-scoped home of the open transaction.
///
/// Inserted into the request extensions by [`coordinate`]; the gate and
/// the [`Tx`](crate::extractors::Tx) extractor borrow it from there.
#[derive(Debug, Clone)]
pub struct TxSlot(pub(crate) Arc<Mutex<Option<RequestTransaction>>>);

impl TxSlot {
    fn new(tx: RequestTransaction) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }

    /// Remove the transaction for settling. `Err` means some guard outlived
    /// the handler.
    fn take(&self) -> Result<Option<RequestTransaction>, AppError> {
        self.0
            .try_lock()
            .map(|mut guard| guard.take())
            .map_err(|_| AppError::transaction("Transaction handle escaped its request"))
    }
}

/// How the handler finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    Failed,
    Panicked,
    TimedOut,
}

/// Whether `method` is inspection-only and must never commit.
pub fn is_read_only(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Wrap the rest of the stack in one transaction.
pub async fn coordinate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let method = req.method().clone();
    if method == Method::OPTIONS {
        return next.run(req).await;
    }

    let deadline = state.config.transaction.deadline();
    let started = Instant::now();

    let tx = match tokio::time::timeout(deadline, state.database.begin(deadline)).await {
        Ok(Ok(tx)) => tx,
        Ok(Err(e)) => return ApiError(e.into()).into_response(),
        Err(_) => {
            return ApiError(
                AppError::timeout("Timed out opening a transaction").with_reason("transaction_open"),
            )
            .into_response();
        }
    };
    let tx_id = tx.id();
    let slot = TxSlot::new(tx);
    req.extensions_mut().insert(slot.clone());

    let run = AssertUnwindSafe(next.run(req)).catch_unwind();
    let (outcome, response) = match tokio::time::timeout(remaining(deadline, started), run).await {
        Ok(Ok(response)) if response.status().as_u16() < 400 => (Outcome::Completed, Some(response)),
        Ok(Ok(response)) => (Outcome::Failed, Some(response)),
        Ok(Err(_)) => {
            error!(tx_id, method = %method, "Handler panicked");
            (Outcome::Panicked, None)
        }
        Err(_) => {
            warn!(
                tx_id,
                method = %method,
                deadline_secs = deadline.as_secs(),
                "Request deadline exceeded"
            );
            (Outcome::TimedOut, None)
        }
    };

    let commit = outcome == Outcome::Completed && !is_read_only(&method);
    if let Err(err) = settle(&slot, commit).await {
        return ApiError(err).into_response();
    }
    debug!(
        tx_id,
        method = %method,
        outcome = ?outcome,
        committed = commit,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request transaction settled"
    );

    match (outcome, response) {
        (_, Some(response)) => response,
        (Outcome::TimedOut, _) => {
            ApiError(AppError::timeout("Request deadline exceeded")).into_response()
        }
        _ => ApiError(AppError::internal("Request aborted")).into_response(),
    }
}

/// What is left of `deadline` for the handler; opening the transaction
/// counts against it.
fn remaining(deadline: Duration, started: Instant) -> Duration {
    deadline.saturating_sub(started.elapsed())
}

/// Commit or roll back exactly once.
async fn settle(slot: &TxSlot, commit: bool) -> Result<(), AppError> {
    let tx = slot
        .take()?
        .ok_or_else(|| AppError::transaction("Transaction settled outside the coordinator"))?;
    if commit {
        tx.commit().await?;
    } else {
        tx.rollback().await?;
    }
    Ok(())
}
