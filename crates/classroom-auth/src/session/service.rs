//! Register, login, refresh, logout, and password change.
//!
//! Every flow runs on the caller's request transaction. Minting a pair and
//! registering its token-id happen in that same transaction, so a pair is
//! never handed out without a live registry entry.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use classroom_core::config::{AuthConfig, RefreshPolicy};
use classroom_core::error::AppError;
use classroom_core::result::AppResult;
use classroom_database::RequestTransaction;
use classroom_database::repositories::AccountRepository;
use classroom_entity::user::{Account, AccountChanges, NewAccount, Role};

use crate::gate::Principal;
use crate::jwt::{IssuedPair, TokenCodec, TokenUse};
use crate::password::{PasswordHasher, PasswordPolicy};
use crate::revocation::RevocationStore;

/// Self-service registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// An account together with the pair just minted for it.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub account: Account,
    pub tokens: IssuedPair,
}

/// Session flows composed from the codec, the registry, and the hasher.
#[derive(Debug, Clone)]
pub struct SessionAuthService {
    codec: Arc<TokenCodec>,
    hasher: PasswordHasher,
    passwords: PasswordPolicy,
    revocations: RevocationStore,
    access_ttl: Duration,
    refresh_policy: RefreshPolicy,
}

impl SessionAuthService {
    pub fn new(codec: Arc<TokenCodec>, config: &AuthConfig) -> Self {
        Self {
            codec,
            hasher: PasswordHasher,
            passwords: PasswordPolicy::new(config),
            revocations: RevocationStore,
            access_ttl: Duration::from_secs(config.access_ttl_minutes.saturating_mul(60)),
            refresh_policy: config.refresh_policy,
        }
    }

    /// Create a `user` account and open its first session.
    pub async fn register(
        &self,
        tx: &mut RequestTransaction,
        registration: Registration,
    ) -> AppResult<SessionGrant> {
        self.passwords.check(&registration.password)?;
        let password_hash = self.hasher.hash(&registration.password)?;

        let account = AccountRepository::create(
            tx,
            &NewAccount {
                username: registration.username,
                email: registration.email,
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
                role: Role::User,
            },
        )
        .await?;

        let tokens = self.mint(tx, account.id, account.role).await?;
        info!(user_id = account.id, token_id = %tokens.token_id, "Account registered");
        Ok(SessionGrant { account, tokens })
    }

    /// Open a session for the account named by `login` (username or email).
    pub async fn login(
        &self,
        tx: &mut RequestTransaction,
        login: &str,
        password: &str,
    ) -> AppResult<SessionGrant> {
        let account = AccountRepository::find_by_login(tx, login)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !self.hasher.verify(password, &account.password_hash)? {
            info!(user_id = account.id, "Login rejected: wrong password");
            return Err(invalid_credentials());
        }

        let tokens = self.mint(tx, account.id, account.role).await?;
        info!(user_id = account.id, token_id = %tokens.token_id, "Logged in");
        Ok(SessionGrant { account, tokens })
    }

    /// Mint a new pair from an accepted refresh credential.
    ///
    /// The role stays the one embedded at the original login. What happens
    /// to the presented token-id follows the configured [`RefreshPolicy`].
    pub async fn refresh(
        &self,
        tx: &mut RequestTransaction,
        principal: &Principal,
    ) -> AppResult<IssuedPair> {
        if principal.token_use != TokenUse::Refresh {
            return Err(AppError::unauthorized("A refresh token is required")
                .with_reason("invalid_token"));
        }
        if !self.revocations.is_live(tx, &principal.token_id).await? {
            return Err(AppError::unauthorized("Token has been revoked")
                .with_reason("revoked_token"));
        }

        let tokens = self.mint(tx, principal.user_id, principal.role).await?;
        if self.refresh_policy == RefreshPolicy::RevokePrevious {
            self.revocations.revoke(tx, &principal.token_id).await?;
        }
        info!(
            user_id = principal.user_id,
            previous = %principal.token_id,
            token_id = %tokens.token_id,
            policy = %self.refresh_policy,
            "Session refreshed"
        );
        Ok(tokens)
    }

    /// Revoke the principal's token-id. Both halves of its pair stop working.
    pub async fn logout(
        &self,
        tx: &mut RequestTransaction,
        principal: &Principal,
    ) -> AppResult<()> {
        self.revocations.revoke(tx, &principal.token_id).await?;
        info!(user_id = principal.user_id, token_id = %principal.token_id, "Logged out");
        Ok(())
    }

    /// Replace the principal's password after checking the current one.
    pub async fn change_password(
        &self,
        tx: &mut RequestTransaction,
        principal: &Principal,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let account = self.account(tx, principal).await?;
        if !self.hasher.verify(old_password, &account.password_hash)? {
            return Err(AppError::validation("Current password is incorrect")
                .with_reason("wrong_password"));
        }
        self.passwords.check(new_password)?;

        let changes = AccountChanges {
            password_hash: Some(self.hasher.hash(new_password)?),
            ..AccountChanges::default()
        };
        AccountRepository::update(tx, account.id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))?;
        info!(user_id = account.id, "Password changed");
        Ok(())
    }

    /// The principal's own account.
    pub async fn account(
        &self,
        tx: &mut RequestTransaction,
        principal: &Principal,
    ) -> AppResult<Account> {
        AccountRepository::find_by_id(tx, principal.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))
    }

    /// Access-token lifetime, in seconds.
    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl.as_secs()
    }

    async fn mint(
        &self,
        tx: &mut RequestTransaction,
        user_id: i64,
        role: Role,
    ) -> AppResult<IssuedPair> {
        let tokens = self.codec.issue(user_id, role, self.access_ttl)?;
        self.revocations.register(tx, &tokens.token_id).await?;
        Ok(tokens)
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid username, email, or password")
        .with_reason("invalid_credentials")
}
