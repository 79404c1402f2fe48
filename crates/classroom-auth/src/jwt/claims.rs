//! Claims carried by access and refresh tokens.

use serde::{Deserialize, Serialize};

use classroom_entity::user::Role;

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    /// Expiring credential for resource requests.
    Access,
    /// Non-expiring credential that only mints new pairs.
    Refresh,
}

/// Verified token payload.
///
/// The role is a snapshot from issuance; it is never re-read from storage
/// while the token is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id of the principal.
    pub user_id: i64,
    /// Role at issuance.
    pub role: Role,
    /// Expiry (seconds since epoch). Absent on refresh tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Token-id shared by both halves of the pair.
    pub jti: String,
    pub token_use: TokenUse,
}
