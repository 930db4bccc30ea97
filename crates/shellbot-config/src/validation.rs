//! Full configuration validation.
//!
//! Checks numeric ranges and the relations between relay and connection
//! settings, collecting every problem before failing.

use crate::schema::BotConfig;
use shellbot_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &BotConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let relay = &config.relay;
    validate_range(&mut errors, "relay.max_message_bytes", relay.max_message_bytes, 256, 64 * 1024);
    validate_range(
        &mut errors,
        "relay.read_chunk_bytes",
        relay.read_chunk_bytes,
        1,
        relay.max_message_bytes.max(1),
    );
    validate_range(&mut errors, "relay.poll_interval_ms", relay.poll_interval_ms, 1, 10_000);

    if config.shell.program.trim().is_empty() {
        errors.push("shell.program must not be empty".to_string());
    }
    validate_range(&mut errors, "shell.cols", config.shell.cols, 1, u16::MAX);
    validate_range(&mut errors, "shell.rows", config.shell.rows, 1, u16::MAX);

    let conn = &config.connection;
    validate_range(&mut errors, "connection.retry_delay_secs", conn.retry_delay_secs, 0, 3600);
    if conn.request_timeout() <= conn.sync_timeout() {
        errors.push(format!(
            "connection.request_timeout_secs ({}) must exceed connection.sync_timeout_ms ({} ms)",
            conn.request_timeout_secs, conn.sync_timeout_ms
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range<T>(errors: &mut Vec<String>, field: &str, value: T, min: T, max: T)
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        errors.push(format!("{field} must be between {min} and {max}, got {value}"));
    }
}
