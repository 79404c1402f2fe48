//! Token-id registry repository.
//!
//! Same-token-id races are settled by the store: the insert relies on the
//! unique index and the revoke on the row lock taken by `UPDATE`.

use classroom_core::error::{AppError, ErrorKind};
use classroom_core::result::AppResult;
use classroom_entity::token::RevocationEntry;

use crate::transaction::{RequestTransaction, TxBackend};

/// Reads and writes on the `tokens` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenRepository;

impl TokenRepository {
    /// Insert a live entry. Returns `None` when the token-id already exists.
    pub async fn insert(
        tx: &mut RequestTransaction,
        token_id: &str,
    ) -> AppResult<Option<RevocationEntry>> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => sqlx::query_as::<_, RevocationEntry>(
                "INSERT INTO tokens (token_id) VALUES ($1) \
                 ON CONFLICT (token_id) DO NOTHING RETURNING *",
            )
            .bind(token_id)
            .fetch_optional(&mut **pg)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert token", e)),
            TxBackend::Memory(mem) => Ok(mem.insert_token(token_id).await),
        }
    }

    /// Find an entry, live or not.
    pub async fn find(
        tx: &mut RequestTransaction,
        token_id: &str,
    ) -> AppResult<Option<RevocationEntry>> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => {
                sqlx::query_as::<_, RevocationEntry>("SELECT * FROM tokens WHERE token_id = $1")
                    .bind(token_id)
                    .fetch_optional(&mut **pg)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to find token", e)
                    })
            }
            TxBackend::Memory(mem) => Ok(mem.token(token_id).await),
        }
    }

    /// Whether a live entry exists.
    pub async fn is_live(tx: &mut RequestTransaction, token_id: &str) -> AppResult<bool> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM tokens WHERE token_id = $1 AND deleted_at IS NULL)",
            )
            .bind(token_id)
            .fetch_one(&mut **pg)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check token state", e)
            }),
            TxBackend::Memory(mem) => Ok(mem
                .token(token_id)
                .await
                .is_some_and(|entry| entry.is_live())),
        }
    }

    /// Soft-delete a live entry. Returns `false` when none was live.
    pub async fn revoke(tx: &mut RequestTransaction, token_id: &str) -> AppResult<bool> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => sqlx::query(
                "UPDATE tokens SET deleted_at = NOW() WHERE token_id = $1 AND deleted_at IS NULL",
            )
            .bind(token_id)
            .execute(&mut **pg)
            .await
            .map(|done| done.rows_affected() > 0)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke token", e)),
            TxBackend::Memory(mem) => Ok(mem.revoke_token(token_id).await),
        }
    }
}
