//! Revocation registry entities.

pub mod model;

pub use model::RevocationEntry;
