use std::path::PathBuf;

use clap::Parser;

/// shellbot: drive an interactive shell from Matrix rooms.
///
/// Every option falls back to a `SHELLBOT_*` environment variable.
#[derive(Parser, Debug)]
#[command(name = "shellbot", version, about)]
pub struct Args {
    /// Matrix homeserver URL.
    #[arg(long, env = "SHELLBOT_HOMESERVER", default_value = "https://matrix.org")]
    pub homeserver: String,

    /// Authorize a user to issue commands and invite the bot to rooms.
    /// Repeatable; comma-separated when given through the environment.
    #[arg(long, env = "SHELLBOT_AUTHORIZE", value_delimiter = ',', required = true)]
    pub authorize: Vec<String>,

    /// Bot account username.
    #[arg(env = "SHELLBOT_USERNAME")]
    pub username: String,

    /// Bot account password.
    #[arg(env = "SHELLBOT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Config file path override.
    #[arg(long, env = "SHELLBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, env = "SHELLBOT_LOG_LEVEL",
          value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: Option<String>,

    /// Shell program to run instead of the configured one.
    #[arg(long, env = "SHELLBOT_SHELL")]
    pub shell: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
