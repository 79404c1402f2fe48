//! Per-operation authorization.
//!
//! The decision runs in a fixed order and stops at the first failure:
//! bearer extraction, signature and expiry, revocation, role-map lookup,
//! and role subsumption.

pub mod decision;
pub mod error;
pub mod operation;
pub mod policy;
pub mod principal;

pub use decision::AuthorizationGate;
pub use error::{AccessDenied, GateError};
pub use operation::Operation;
pub use policy::AccessPolicy;
pub use principal::Principal;
