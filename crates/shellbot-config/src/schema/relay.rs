//! Output relay tunables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How shell output is batched into chat messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Buffered bytes above which output is split into a message without
    /// waiting for the shell to go idle.
    pub max_message_bytes: usize,
    /// Largest single read from the PTY.
    pub read_chunk_bytes: usize,
    /// How long the relay waits for output before treating the shell as idle.
    pub poll_interval_ms: u64,
}

impl RelayConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: 16 * 1024,
            read_chunk_bytes: 1024,
            poll_interval_ms: 100,
        }
    }
}
