//! Account management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use classroom_entity::user::AccountQuery;

use crate::dto::request::{CreateUserRequest, ListUsersQuery, UpdateUserRequest};
use crate::dto::response::{UserListResponse, UserResponse};
use crate::error::ApiResult;
use crate::extractors::{CurrentUser, Tx, ValidJson, ValidQuery};
use crate::state::AppState;

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    mut tx: Tx,
    ValidQuery(query): ValidQuery<ListUsersQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let query = AccountQuery::from(query);
    let accounts = state.accounts.list(&mut tx, &query).await?;
    Ok(Json(UserListResponse {
        users: accounts.into_iter().map(UserResponse::from).collect(),
        page: query.page,
        page_size: query.page_size,
    }))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    mut tx: Tx,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let account = state.accounts.create(&mut tx, &principal, req.into()).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// GET /api/v1/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<i64>,
    mut tx: Tx,
) -> ApiResult<Json<UserResponse>> {
    let account = state.accounts.get(&mut tx, &principal, user_id).await?;
    Ok(Json(account.into()))
}

/// PUT /api/v1/users/{user_id}
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<i64>,
    mut tx: Tx,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let account = state
        .accounts
        .update(&mut tx, &principal, user_id, req.into())
        .await?;
    Ok(Json(account.into()))
}
