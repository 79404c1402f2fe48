//! The authorization decision.

use std::sync::Arc;

use tracing::debug;

use classroom_core::error::AppError;
use classroom_database::RequestTransaction;
use classroom_entity::user::Role;

use super::error::{AccessDenied, GateError};
use super::operation::Operation;
use super::policy::AccessPolicy;
use super::principal::Principal;
use crate::jwt::{TokenCodec, TokenError};
use crate::rbac::RoleHierarchy;
use crate::revocation::RevocationStore;

/// Accepts or rejects a request for one operation before any business
/// logic runs.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    codec: Arc<TokenCodec>,
    policy: Arc<AccessPolicy>,
    revocations: RevocationStore,
}

impl AuthorizationGate {
    pub fn new(codec: Arc<TokenCodec>, policy: AccessPolicy) -> Self {
        Self {
            codec,
            policy: Arc::new(policy),
            revocations: RevocationStore,
        }
    }

    /// Run the full decision for `operation`.
    ///
    /// `authorization` is the raw `Authorization` header value, if any. The
    /// revocation lookup runs on the request's own transaction.
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        operation: Operation,
        tx: &mut RequestTransaction,
    ) -> Result<Principal, GateError> {
        let token = bearer_token(authorization)?;
        let claims = self.codec.verify(token).map_err(|e| match e {
            TokenError::Expired | TokenError::Invalid(_) => {
                AccessDenied::InvalidToken(e.to_string())
            }
            TokenError::Signing(_) => {
                AccessDenied::InvalidToken("unverifiable token".to_string())
            }
        })?;
        if claims.token_use != operation.accepts() {
            return Err(AccessDenied::InvalidToken(format!(
                "{:?} token presented to '{operation}'",
                claims.token_use
            ))
            .into());
        }

        let live = self
            .revocations
            .is_live(tx, &claims.jti)
            .await
            .map_err(AppError::from)?;
        if !live {
            return Err(AccessDenied::RevokedToken.into());
        }

        self.check_role(&claims.role, operation)?;

        debug!(
            user_id = claims.user_id,
            role = %claims.role,
            token_id = %claims.jti,
            operation = %operation,
            "Request authorized"
        );
        Ok(Principal::from(claims))
    }

    /// Steps four and five: role-map lookup, then subsumption.
    pub fn check_role(&self, role: &Role, operation: Operation) -> Result<(), AccessDenied> {
        let allowed = self
            .policy
            .allowed(operation)
            .ok_or(AccessDenied::UnmappedOperation(operation))?;
        if RoleHierarchy::subsumes_any(*role, allowed) {
            Ok(())
        } else {
            Err(AccessDenied::InsufficientRole(operation))
        }
    }
}

/// Extract `<token>` from a literal `Bearer <token>` header.
fn bearer_token(header: Option<&str>) -> Result<&str, AccessDenied> {
    let value = header.ok_or(AccessDenied::MissingCredential)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AccessDenied::MissingCredential)?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AccessDenied::MissingCredential);
    }
    Ok(token)
}
