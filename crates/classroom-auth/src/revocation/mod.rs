//! Registry of live token-ids.

pub mod store;

pub use store::{RevocationError, RevocationStore};
