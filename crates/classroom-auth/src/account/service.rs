//! Account reads and writes with record-level checks.
//!
//! The gate decides whether a role may call an operation at all. The checks
//! here narrow that to specific records: callers below superadmin only see
//! and edit their own account, and nobody grants a role senior to theirs.

use tracing::info;

use classroom_core::error::AppError;
use classroom_core::result::AppResult;
use classroom_database::RequestTransaction;
use classroom_database::repositories::AccountRepository;
use classroom_entity::user::{Account, AccountChanges, AccountQuery, NewAccount, Role};

use crate::gate::Principal;
use crate::password::{PasswordHasher, PasswordPolicy};
use crate::rbac::RoleHierarchy;

/// Staff-created account.
#[derive(Debug, Clone)]
pub struct NewAccountRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Profile edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone)]
pub struct AccountService {
    hasher: PasswordHasher,
    passwords: PasswordPolicy,
}

impl AccountService {
    pub fn new(passwords: PasswordPolicy) -> Self {
        Self {
            hasher: PasswordHasher,
            passwords,
        }
    }

    /// Fetch `user_id`, which must be the caller's own unless superadmin.
    pub async fn get(
        &self,
        tx: &mut RequestTransaction,
        principal: &Principal,
        user_id: i64,
    ) -> AppResult<Account> {
        if !principal.may_act_on(user_id) {
            return Err(AppError::forbidden("You can only access your own account")
                .with_reason("not_owner"));
        }
        AccountRepository::find_by_id(tx, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Account {user_id} not found")))
    }

    pub async fn list(
        &self,
        tx: &mut RequestTransaction,
        query: &AccountQuery,
    ) -> AppResult<Vec<Account>> {
        AccountRepository::list(tx, query).await
    }

    /// Create an account whose role the caller's own role subsumes.
    pub async fn create(
        &self,
        tx: &mut RequestTransaction,
        principal: &Principal,
        request: NewAccountRequest,
    ) -> AppResult<Account> {
        if !RoleHierarchy::subsumes(principal.role, request.role) {
            return Err(AppError::forbidden(format!(
                "Role '{}' cannot create '{}' accounts",
                principal.role, request.role
            ))
            .with_reason("role_escalation"));
        }
        self.passwords.check(&request.password)?;
        let password_hash = self.hasher.hash(&request.password)?;

        let account = AccountRepository::create(
            tx,
            &NewAccount {
                username: request.username,
                email: request.email,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                role: request.role,
            },
        )
        .await?;
        info!(
            user_id = account.id,
            role = %account.role,
            created_by = principal.user_id,
            "Account created"
        );
        Ok(account)
    }

    /// Edit `user_id`. Only a superadmin may edit others or change roles.
    pub async fn update(
        &self,
        tx: &mut RequestTransaction,
        principal: &Principal,
        user_id: i64,
        update: AccountUpdate,
    ) -> AppResult<Account> {
        if !principal.may_act_on(user_id) {
            return Err(AppError::forbidden("You can only update your own account")
                .with_reason("not_owner"));
        }
        if update.role.is_some() && principal.role != Role::SuperAdmin {
            return Err(AppError::forbidden("Only a superadmin can change roles")
                .with_reason("role_change"));
        }

        let changes = AccountChanges {
            username: update.username,
            email: update.email,
            first_name: update.first_name,
            last_name: update.last_name,
            role: update.role,
            password_hash: None,
        };
        let account = AccountRepository::update(tx, user_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Account {user_id} not found")))?;
        info!(user_id, updated_by = principal.user_id, "Account updated");
        Ok(account)
    }
}
