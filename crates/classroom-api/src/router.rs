//! Route definitions for the Classroom HTTP API.
//!
//! All routes are mounted under `/api/v1`. Every protected route names the
//! [`Operation`] it performs at registration time; the gate for that
//! operation runs as a route layer in front of the handler.

use axum::Router;
use axum::routing::{delete, get, post, put};

use classroom_auth::Operation;

use crate::handlers;
use crate::middleware::guard;
use crate::state::AppState;

/// Build the API router. Cross-cutting layers are added by
/// [`build_app`](crate::app::build_app).
pub fn build_router(state: &AppState) -> Router<AppState> {
    let api_routes = Router::new()
        .merge(auth_routes(state))
        .merge(user_routes(state))
        .merge(health_routes());

    Router::new().nest("/api/v1", api_routes)
}

/// Session endpoints.
fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/logout",
            guard(state, Operation::Logout, delete(handlers::auth::logout)),
        )
        .route(
            "/auth/change-password",
            guard(
                state,
                Operation::ChangePassword,
                put(handlers::auth::change_password),
            ),
        )
        .route(
            "/auth/refresh-token",
            guard(
                state,
                Operation::RefreshToken,
                post(handlers::auth::refresh_token),
            ),
        )
        .route(
            "/auth/account",
            guard(state, Operation::GetAccount, get(handlers::auth::account)),
        )
}

/// Account management.
fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            guard(state, Operation::ListUsers, get(handlers::user::list_users)).merge(guard(
                state,
                Operation::CreateUser,
                post(handlers::user::create_user),
            )),
        )
        .route(
            "/users/{user_id}",
            guard(state, Operation::GetUser, get(handlers::user::get_user)).merge(guard(
                state,
                Operation::UpdateUser,
                put(handlers::user::update_user),
            )),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
