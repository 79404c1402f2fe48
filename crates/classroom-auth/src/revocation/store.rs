//! Token-id registry backed by the `tokens` table.
//!
//! Every call runs inside the caller's request transaction and goes to the
//! store; revocation state is never cached between requests.

use thiserror::Error;
use tracing::debug;

use classroom_core::error::{AppError, ErrorKind};
use classroom_database::RequestTransaction;
use classroom_database::repositories::TokenRepository;

/// Registry failures.
#[derive(Debug, Error)]
pub enum RevocationError {
    /// The token-id is already registered.
    #[error("token id '{0}' is already registered")]
    Conflict(String),
    /// No live entry exists for the token-id.
    #[error("token id '{0}' is not registered")]
    NotFound(String),
    /// The store itself failed.
    #[error(transparent)]
    Storage(#[from] AppError),
}

impl From<RevocationError> for AppError {
    fn from(err: RevocationError) -> Self {
        match err {
            RevocationError::Storage(inner) => inner,
            // A collision means a minted pair would go untracked.
            RevocationError::Conflict(_) => {
                AppError::with_source(ErrorKind::Internal, "Failed to register session", err)
            }
            RevocationError::NotFound(_) => {
                AppError::not_found("Session not found").with_reason("token_not_found")
            }
        }
    }
}

/// Register, query, and revoke token-ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevocationStore;

impl RevocationStore {
    /// Record a freshly minted token-id as live.
    pub async fn register(
        &self,
        tx: &mut RequestTransaction,
        token_id: &str,
    ) -> Result<(), RevocationError> {
        match TokenRepository::insert(tx, token_id).await? {
            Some(_) => {
                debug!(token_id, "Token id registered");
                Ok(())
            }
            None => Err(RevocationError::Conflict(token_id.to_string())),
        }
    }

    /// True iff the token-id is registered and not soft-deleted.
    pub async fn is_live(
        &self,
        tx: &mut RequestTransaction,
        token_id: &str,
    ) -> Result<bool, RevocationError> {
        Ok(TokenRepository::is_live(tx, token_id).await?)
    }

    /// Soft-delete a live token-id.
    pub async fn revoke(
        &self,
        tx: &mut RequestTransaction,
        token_id: &str,
    ) -> Result<(), RevocationError> {
        if TokenRepository::revoke(tx, token_id).await? {
            debug!(token_id, "Token id revoked");
            Ok(())
        } else {
            Err(RevocationError::NotFound(token_id.to_string()))
        }
    }
}
