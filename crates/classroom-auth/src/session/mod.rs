//! Session lifecycle.

pub mod service;

pub use service::{Registration, SessionAuthService, SessionGrant};
