//! `CurrentUser` extractor: the principal the gate attached to the request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use classroom_auth::Principal;
use classroom_core::error::AppError;

use crate::error::ApiError;

/// Verified caller available in handlers behind the gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl std::ops::Deref for CurrentUser {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                AppError::unauthorized("Authentication required")
                    .with_reason("missing_credential")
                    .into()
            })
    }
}
