//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use classroom_auth::account::{AccountUpdate, NewAccountRequest};
use classroom_auth::session::Registration;
use classroom_entity::user::{AccountQuery, AccountSort, Role, SortOrder};

fn alphanumeric(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("alphanumeric"))
    }
}

/// Registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 20), custom(function = "alphanumeric"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 2, max = 120))]
    pub first_name: String,
    #[validate(length(min = 2, max = 120))]
    pub last_name: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

/// Login body. Either `username` or `email` identifies the account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3), custom(function = "alphanumeric"))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    /// The login name to look up; username wins when both are given.
    pub fn login(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Password change body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(length(min = 1, max = 255, message = "New password is required"))]
    pub new_password: String,
}

/// Staff account creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 20), custom(function = "alphanumeric"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 2, max = 120))]
    pub first_name: String,
    #[validate(length(min = 2, max = 120))]
    pub last_name: String,
    pub role: Role,
}

impl From<CreateUserRequest> for NewAccountRequest {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
        }
    }
}

/// Profile edit body. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 20), custom(function = "alphanumeric"))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

impl From<UpdateUserRequest> for AccountUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
        }
    }
}

/// `GET /users` query string.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListUsersQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,
    #[serde(default)]
    pub sort: AccountSort,
    #[serde(default)]
    pub order: SortOrder,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

impl From<ListUsersQuery> for AccountQuery {
    fn from(query: ListUsersQuery) -> Self {
        Self {
            page: query.page,
            page_size: query.page_size,
            sort: query.sort,
            order: query.order,
        }
    }
}
