//! The error type shared by every Classroom crate.
//!
//! Component errors (token, gate, revocation, transaction) convert into
//! [`AppError`] so `?` works across crate boundaries. The HTTP layer reads
//! `kind` for the status code and `reason` for the machine-readable tag.

use std::fmt;
use thiserror::Error;

/// Broad failure class; decides the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No such record.
    NotFound,
    /// Credential missing, malformed, invalid, expired, or revoked.
    Unauthorized,
    /// Authenticated, but the role or ownership check failed.
    Forbidden,
    /// Request body or parameters were rejected.
    Validation,
    /// Unique key taken, or a staged write lost a race.
    Conflict,
    /// Bug or unexpected state.
    Internal,
    /// The store returned an error.
    Database,
    /// A request transaction could not be opened or settled.
    Transaction,
    /// The request ran past its deadline.
    Timeout,
    /// Settings could not be loaded.
    Configuration,
}

impl ErrorKind {
    /// Kinds whose message may carry internals and is never shown to clients.
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            Self::Internal | Self::Database | Self::Transaction | Self::Configuration
        )
    }

    fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation => "VALIDATION",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
            Self::Database => "DATABASE",
            Self::Transaction => "TRANSACTION",
            Self::Timeout => "TIMEOUT",
            Self::Configuration => "CONFIGURATION",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A failure on its way to the client.
///
/// `reason` narrows the kind with a short snake_case tag, e.g.
/// `revoked_token` inside an `Unauthorized` error. It is safe to expose.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub reason: Option<&'static str>,
    /// Lower-level cause, kept for logs only.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            reason: None,
            source: None,
        }
    }

    /// Wrap `source` under `kind`.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    /// Attach a reason tag.
    pub fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// 401.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// 403.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transaction, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

/// Clones drop `source`, which is not `Clone`.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            reason: self.reason,
            source: None,
        }
    }
}
