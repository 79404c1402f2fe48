//! Convenience result type alias for Classroom.

use crate::error::AppError;

/// A specialized `Result` type for Classroom operations.
pub type AppResult<T> = Result<T, AppError>;
