//! # classroom-entity
//!
//! Domain entity models for Classroom. Every struct in this crate represents
//! a database table row or a domain value object. Row types additionally
//! derive `sqlx::FromRow`.

pub mod token;
pub mod user;
