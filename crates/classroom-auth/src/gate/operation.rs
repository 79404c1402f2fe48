//! Protected operations.

use std::fmt;

use crate::jwt::TokenUse;

/// Every operation that sits behind the gate.
///
/// Routes name their operation when they are registered, so there is no
/// runtime lookup by handler name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Logout,
    ChangePassword,
    RefreshToken,
    GetAccount,
    GetUser,
    ListUsers,
    CreateUser,
    UpdateUser,
}

impl Operation {
    /// All operations, in route order.
    pub const ALL: [Operation; 8] = [
        Operation::Logout,
        Operation::ChangePassword,
        Operation::RefreshToken,
        Operation::GetAccount,
        Operation::GetUser,
        Operation::ListUsers,
        Operation::CreateUser,
        Operation::UpdateUser,
    ];

    /// The token kind this operation accepts as its bearer credential.
    pub fn accepts(&self) -> TokenUse {
        match self {
            Self::RefreshToken => TokenUse::Refresh,
            _ => TokenUse::Access,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logout => "logout",
            Self::ChangePassword => "change_password",
            Self::RefreshToken => "refresh_token",
            Self::GetAccount => "get_account",
            Self::GetUser => "get_user",
            Self::ListUsers => "list_users",
            Self::CreateUser => "create_user",
            Self::UpdateUser => "update_user",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
