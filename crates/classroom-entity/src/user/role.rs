//! Account role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available to Classroom accounts.
///
/// The set is closed and linearly ordered: SuperAdmin > Admin > User.
/// The role is embedded in issued tokens, so it is a snapshot taken at
/// issuance rather than a live lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account (students).
    #[serde(alias = "student")]
    User,
    /// Staff account that manages other accounts.
    Admin,
    /// Unrestricted account.
    SuperAdmin,
}

impl Role {
    /// All roles from least to most senior.
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    /// Seniority rank (higher = more senior).
    pub fn rank(&self) -> u8 {
        match self {
            Self::User => 1,
            Self::Admin => 2,
            Self::SuperAdmin => 3,
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = classroom_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" | "student" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(classroom_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: superadmin, admin, user"
            ))),
        }
    }
}
