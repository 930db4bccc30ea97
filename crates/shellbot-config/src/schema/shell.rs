//! Shell process configuration types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shell process settings.
///
/// The shell inherits the bot's environment; `env` adds or overrides
/// variables on top of it and `term` always wins for `TERM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell program, resolved through `PATH`.
    pub program: String,
    /// Extra arguments passed to the shell.
    pub args: Vec<String>,
    /// Value of `TERM` inside the shell.
    pub term: String,
    pub cols: u16,
    pub rows: u16,
    /// Extra environment variables injected into the shell.
    pub env: HashMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            args: Vec::new(),
            term: "vt100".to_string(),
            cols: 80,
            rows: 24,
            env: HashMap::new(),
        }
    }
}
