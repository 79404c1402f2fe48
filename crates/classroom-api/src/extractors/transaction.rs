//! `Tx` extractor: exclusive access to the request's open transaction.

use std::ops::{Deref, DerefMut};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::sync::{OwnedMappedMutexGuard, OwnedMutexGuard};

use classroom_core::error::AppError;
use classroom_database::RequestTransaction;

use crate::error::ApiError;
use crate::middleware::TxSlot;

/// The request's transaction, held for as long as the extractor lives.
///
/// Dereferences to [`RequestTransaction`], so `&mut tx` can be handed to
/// any service call. It cannot be committed or rolled back from here; the
/// coordinator settles it once the handler returns.
pub struct Tx(OwnedMappedMutexGuard<Option<RequestTransaction>, RequestTransaction>);

impl std::fmt::Debug for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Tx").field(&self.0.id()).finish()
    }
}

impl Deref for Tx {
    type Target = RequestTransaction;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Tx {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Tx {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let slot = parts
            .extensions
            .get::<TxSlot>()
            .cloned()
            .ok_or_else(|| AppError::internal("No request transaction is open"))?;

        let guard = slot.0.lock_owned().await;
        OwnedMutexGuard::try_map(guard, Option::as_mut)
            .map(Tx)
            .map_err(|_| AppError::transaction("Transaction already settled").into())
    }
}
