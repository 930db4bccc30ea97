use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures reported by the chat transport.
///
/// Only [`TransportError::Timeout`] and [`TransportError::Connection`] are
/// transient; the connection supervisor retries those and treats every other
/// variant as fatal.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("http {status}: {message}")]
    Http { status: u16, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShellbotError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("relay error: {0}")]
    Relay(String),

    #[error("{0}")]
    Other(String),
}
