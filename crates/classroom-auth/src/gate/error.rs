//! Gate failures.

use thiserror::Error;

use classroom_core::error::AppError;

use super::operation::Operation;

/// The five ways the gate rejects a request.
///
/// The first three are credential problems (401); the last two are
/// authorization problems (403).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("missing or malformed bearer credential")]
    MissingCredential,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token has been revoked")]
    RevokedToken,
    #[error("operation '{0}' is not granted to any role")]
    UnmappedOperation(Operation),
    #[error("role is insufficient for operation '{0}'")]
    InsufficientRole(Operation),
}

impl AccessDenied {
    /// HTTP status for this failure.
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingCredential | Self::InvalidToken(_) | Self::RevokedToken => 401,
            Self::UnmappedOperation(_) | Self::InsufficientRole(_) => 403,
        }
    }

    /// Machine-readable reason tag.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidToken(_) => "invalid_token",
            Self::RevokedToken => "revoked_token",
            Self::UnmappedOperation(_) => "unmapped_operation",
            Self::InsufficientRole(_) => "insufficient_role",
        }
    }
}

impl From<AccessDenied> for AppError {
    fn from(denied: AccessDenied) -> Self {
        let reason = denied.reason();
        let base = match denied.status() {
            401 => AppError::unauthorized(denied.to_string()),
            _ => AppError::forbidden(denied.to_string()),
        };
        base.with_reason(reason)
    }
}

/// Gate outcome other than acceptance.
#[derive(Debug, Error)]
pub enum GateError {
    /// The request was rejected.
    #[error(transparent)]
    Denied(#[from] AccessDenied),
    /// The revocation lookup itself failed.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Denied(denied) => denied.into(),
            GateError::Store(inner) => inner,
        }
    }
}
