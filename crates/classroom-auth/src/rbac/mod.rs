//! Role-based access control.

pub mod hierarchy;

pub use hierarchy::RoleHierarchy;
