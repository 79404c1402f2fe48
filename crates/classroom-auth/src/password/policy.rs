//! Password acceptance rules.

use classroom_core::config::AuthConfig;
use classroom_core::error::AppError;

/// Minimum requirements for a new password.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl PasswordPolicy {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Reject passwords that are too short (counted in characters).
    pub fn check(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            ))
            .with_reason("weak_password"));
        }
        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}
