//! Per-request transaction configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the transaction opened around every non-preflight request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Upper bound on how long one request may hold its transaction open.
    /// It caps connection pinning; it is not a latency target.
    #[serde(default = "default_deadline")]
    pub deadline_seconds: u64,
}

impl TransactionConfig {
    /// Returns the deadline as a `Duration`.
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_seconds)
    }
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            deadline_seconds: default_deadline(),
        }
    }
}

fn default_deadline() -> u64 {
    60 * 60
}
