//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::Role;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Account role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Partial update of an account. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

impl AccountChanges {
    /// Whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.password_hash.is_none()
    }

    /// Apply the changes to an in-memory copy of the row.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(username) = &self.username {
            account.username = username.clone();
        }
        if let Some(email) = &self.email {
            account.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            account.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            account.last_name = last_name.clone();
        }
        if let Some(role) = self.role {
            account.role = role;
        }
        if let Some(hash) = &self.password_hash {
            account.password_hash = hash.clone();
        }
        account.updated_at = Utc::now();
    }
}
