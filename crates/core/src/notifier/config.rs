//! Configuration for the notifier module.

use serde::{Deserialize, Serialize};

/// Configuration for notification delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}
