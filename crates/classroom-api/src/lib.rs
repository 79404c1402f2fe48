//! HTTP surface of Classroom.
//!
//! Every request runs inside one [`RequestTransaction`](classroom_database::RequestTransaction)
//! opened by the coordinator middleware; protected routes additionally pass
//! the authorization gate before their handler runs.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
