//! Revocation registry row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `tokens` table.
///
/// A token-id with no deletion marker is live. A soft-deleted or absent
/// token-id is revoked.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RevocationEntry {
    /// Surrogate key.
    pub id: i64,
    /// The `jti` shared by an access/refresh pair.
    pub token_id: String,
    /// When the pair was minted.
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker set on logout.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RevocationEntry {
    /// Whether the entry still authorizes requests.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}
