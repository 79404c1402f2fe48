//! Repositories for Classroom entities.
//!
//! Repositories hold no connection of their own. Every method takes the
//! request's [`RequestTransaction`](crate::RequestTransaction), so all
//! persistent access for a request shares one transaction.

pub mod account;
pub mod token;

pub use account::AccountRepository;
pub use token::TokenRepository;

use classroom_core::error::{AppError, ErrorKind};

/// Map a sqlx error, turning unique violations into conflicts.
pub(crate) fn map_write_error(err: sqlx::Error, context: &str, conflict: &str) -> AppError {
    let unique = matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
    if unique {
        AppError::with_source(ErrorKind::Conflict, conflict.to_string(), err)
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), err)
    }
}
