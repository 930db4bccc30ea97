//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod connection;
mod logging;
mod relay;
mod shell;

pub use connection::*;
pub use logging::*;
pub use relay::*;
pub use shell::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub relay: RelayConfig,
    pub shell: ShellConfig,
    pub connection: ConnectionConfig,
    pub logging: LoggingConfig,
}
