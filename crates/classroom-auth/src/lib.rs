//! # classroom-auth
//!
//! Request authorization and session lifecycle for Classroom.
//!
//! ## Modules
//!
//! - `rbac`: the fixed role order and its subsumption rule
//! - `jwt`: signing and verification of access/refresh token pairs
//! - `revocation`: the persistent registry of live token-ids
//! - `gate`: per-operation authorization decisions
//! - `password`: Argon2id hashing and password policy
//! - `session`: register, login, refresh, logout, and password change
//! - `account`: account reads and writes behind the user routes

pub mod account;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod revocation;
pub mod session;

pub use account::AccountService;
pub use gate::{AccessDenied, AccessPolicy, AuthorizationGate, GateError, Operation, Principal};
pub use jwt::{Claims, IssuedPair, TokenCodec, TokenError, TokenUse};
pub use password::{PasswordHasher, PasswordPolicy};
pub use rbac::RoleHierarchy;
pub use revocation::{RevocationError, RevocationStore};
pub use session::SessionAuthService;
