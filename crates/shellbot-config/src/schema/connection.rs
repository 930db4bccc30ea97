//! Chat connection settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Pause before re-entering the event loop after a transient failure.
    pub retry_delay_secs: u64,
    /// Server-side long-poll duration for each sync request.
    pub sync_timeout_ms: u64,
    /// Client-side limit for any single HTTP request.
    pub request_timeout_secs: u64,
}

impl ConnectionConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            retry_delay_secs: 5,
            sync_timeout_ms: 30_000,
            request_timeout_secs: 60,
        }
    }
}
