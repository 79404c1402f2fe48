//! The verified caller.

use classroom_entity::user::Role;

use crate::jwt::{Claims, TokenUse};

/// Identity attached to a request once the gate has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
    pub token_id: String,
    pub token_use: TokenUse,
}

impl Principal {
    /// Whether the principal may act on `user_id`'s record: its own, or any
    /// record when it is a superadmin.
    pub fn may_act_on(&self, user_id: i64) -> bool {
        self.user_id == user_id || self.role == Role::SuperAdmin
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
            token_id: claims.jti,
            token_use: claims.token_use,
        }
    }
}
