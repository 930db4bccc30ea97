//! Mapping HTTP-level failures onto [`TransportError`].

use serde::Deserialize;
use shellbot_common::TransportError;

/// Standard Matrix error body.
#[derive(Debug, Deserialize)]
struct MatrixErrorBody {
    errcode: String,
    #[serde(default)]
    error: String,
}

/// Classify a failed request. Only timeouts and failures to reach the
/// server are transient.
pub(crate) fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_decode() {
        TransportError::Protocol(e.to_string())
    } else if e.is_connect() || e.is_request() || e.is_body() {
        TransportError::Connection(e.to_string())
    } else {
        TransportError::Protocol(e.to_string())
    }
}

/// Classify a non-2xx response.
///
/// Rate limiting and gateway errors mean the homeserver is temporarily
/// unreachable and are reported as connection errors; everything else
/// (bad credentials, forbidden rooms, ...) is fatal.
pub(crate) fn http_error(status: u16, body: &str) -> TransportError {
    let message = match serde_json::from_str::<MatrixErrorBody>(body) {
        Ok(err) if err.error.is_empty() => err.errcode,
        Ok(err) => format!("{}: {}", err.errcode, err.error),
        Err(_) => body.trim().to_string(),
    };

    match status {
        429 | 502 | 503 | 504 => TransportError::Connection(format!("http {status}: {message}")),
        _ => TransportError::Http { status, message },
    }
}
