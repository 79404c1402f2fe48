//! Extractors that run `validator` rules after deserializing.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

use classroom_core::error::AppError;

use crate::error::ApiError;

fn check<T: Validate>(value: T) -> Result<T, ApiError> {
    value
        .validate()
        .map_err(|e| AppError::validation(e.to_string()).with_reason("invalid_field"))?;
    Ok(value)
}

/// Validated JSON request body.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            AppError::validation(rejection.body_text()).with_reason("malformed_body")
        })?;
        check(value).map(Self)
    }
}

/// Validated query string.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::validation(rejection.body_text()).with_reason("malformed_query")
            })?;
        check(value).map(Self)
    }
}
