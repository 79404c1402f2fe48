//! Custom Axum extractors.

pub mod auth;
pub mod transaction;
pub mod validated;

pub use auth::CurrentUser;
pub use transaction::Tx;
pub use validated::{ValidJson, ValidQuery};
