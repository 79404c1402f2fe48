//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use classroom_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error class.
    pub error: String,
    /// Narrower snake_case tag, e.g. `revoked_token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable message.
    pub message: String,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Transaction
        | ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<&AppError> for ApiErrorResponse {
    fn from(err: &AppError) -> Self {
        let message = if err.kind.is_opaque() {
            "An internal error occurred".to_string()
        } else {
            err.message.clone()
        };
        Self {
            error: err.kind.to_string(),
            reason: err.reason.map(str::to_string),
            message,
        }
    }
}

/// Error returned by handlers and middleware; `?` converts from `AppError`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);
        if err.kind.is_opaque() {
            tracing::error!(
                kind = %err.kind,
                reason = err.reason.unwrap_or("-"),
                error = %err.message,
                source = ?err.source,
                "Internal server error"
            );
        }
        (status, Json(ApiErrorResponse::from(&err))).into_response()
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_kinds_hide_message() {
        let err = AppError::database("relation \"accounts\" does not exist");
        let body = ApiErrorResponse::from(&err);
        assert_eq!(body.error, "DATABASE");
        assert!(!body.message.contains("accounts"));
        assert_eq!(status_for(err.kind), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_reason_is_exposed() {
        let err = AppError::unauthorized("Token has been revoked").with_reason("revoked_token");
        let body = ApiErrorResponse::from(&err);
        assert_eq!(body.reason.as_deref(), Some("revoked_token"));
        assert_eq!(body.message, "Token has been revoked");
        assert_eq!(status_for(err.kind), StatusCode::UNAUTHORIZED);
    }
}
