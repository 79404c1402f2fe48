//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// What happens to the presented token-id when a refresh mints a new pair.
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,
    /// Minimum password length accepted on register and password change.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_policy: RefreshPolicy::default(),
            password_min_length: default_password_min(),
        }
    }
}

/// Policy applied to the previous token-id on refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// The previous token-id stays live; one login may fan out into several
    /// concurrent sibling sessions (one per device).
    #[default]
    KeepSiblings,
    /// The previous token-id is revoked in the same transaction that
    /// registers the new one.
    RevokePrevious,
}

impl std::fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshPolicy::KeepSiblings => write!(f, "keep_siblings"),
            RefreshPolicy::RevokePrevious => write!(f, "revoke_previous"),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    24 * 60
}

fn default_password_min() -> usize {
    6
}
