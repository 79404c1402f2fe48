//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use classroom_auth::{
    AccessPolicy, AccountService, AuthorizationGate, PasswordPolicy, SessionAuthService,
    TokenCodec,
};
use classroom_core::config::AppConfig;
use classroom_database::Database;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Transaction source for every request
    pub database: Database,

    // ── Auth ─────────────────────────────────────────────────
    /// Per-operation access decision
    pub gate: Arc<AuthorizationGate>,
    /// Register/login/refresh/logout flows
    pub sessions: Arc<SessionAuthService>,

    // ── Services ─────────────────────────────────────────────
    pub accounts: Arc<AccountService>,
}

impl AppState {
    /// Wire the services with the standard access policy.
    pub fn new(config: AppConfig, database: Database) -> Self {
        Self::with_policy(config, database, AccessPolicy::standard())
    }

    /// Wire the services with a caller-supplied access policy.
    pub fn with_policy(config: AppConfig, database: Database, policy: AccessPolicy) -> Self {
        let codec = Arc::new(TokenCodec::new(&config.auth));
        let gate = Arc::new(AuthorizationGate::new(Arc::clone(&codec), policy));
        let sessions = Arc::new(SessionAuthService::new(Arc::clone(&codec), &config.auth));
        let accounts = Arc::new(AccountService::new(PasswordPolicy::new(&config.auth)));

        Self {
            config: Arc::new(config),
            database,
            gate,
            sessions,
            accounts,
        }
    }
}
