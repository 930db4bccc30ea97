use shellbot_common::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("shell read failed: {0}")]
    Read(#[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("fatal transport error: {0}")]
    Transport(#[from] TransportError),
}
