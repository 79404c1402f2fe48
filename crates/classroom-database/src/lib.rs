//! # classroom-database
//!
//! PostgreSQL connection management, the per-request transaction handle
//! (with a process-local backend for development and tests), and the
//! repositories that run inside it.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod transaction;

pub use transaction::{
    Database, RequestTransaction, StatsSnapshot, TransactionError, TransactionStats,
};
