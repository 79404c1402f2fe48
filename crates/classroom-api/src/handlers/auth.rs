//! Auth handlers: register, login, logout, change password, refresh, account.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use classroom_core::error::AppError;

use crate::dto::request::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::dto::response::{AuthResponse, MessageResponse, UserResponse};
use crate::error::ApiResult;
use crate::extractors::{CurrentUser, Tx, ValidJson};
use crate::state::AppState;

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    mut tx: Tx,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let grant = state.sessions.register(&mut tx, req.into()).await?;
    let body = AuthResponse::new(grant.tokens, state.sessions.access_ttl_seconds());
    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    mut tx: Tx,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let login = req.login().ok_or_else(|| {
        AppError::validation("Either username or email is required").with_reason("invalid_field")
    })?;
    let grant = state.sessions.login(&mut tx, login, &req.password).await?;
    Ok(Json(AuthResponse::new(
        grant.tokens,
        state.sessions.access_ttl_seconds(),
    )))
}

/// DELETE /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    mut tx: Tx,
) -> ApiResult<StatusCode> {
    state.sessions.logout(&mut tx, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    mut tx: Tx,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .sessions
        .change_password(&mut tx, &principal, &req.old_password, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

/// POST /api/v1/auth/refresh-token
///
/// The refresh token is presented as the bearer credential.
pub async fn refresh_token(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    mut tx: Tx,
) -> ApiResult<Json<AuthResponse>> {
    let tokens = state.sessions.refresh(&mut tx, &principal).await?;
    Ok(Json(AuthResponse::new(
        tokens,
        state.sessions.access_ttl_seconds(),
    )))
}

/// GET /api/v1/auth/account
pub async fn account(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    mut tx: Tx,
) -> ApiResult<Json<UserResponse>> {
    let account = state.sessions.account(&mut tx, &principal).await?;
    Ok(Json(account.into()))
}
