//! Account management behind the user routes.

pub mod service;

pub use service::{AccountService, AccountUpdate, NewAccountRequest};
