use tracing_subscriber::EnvFilter;

const TARGETS: &[&str] = &[
    "shellbot",
    "shellbot_common",
    "shellbot_config",
    "shellbot_matrix",
    "shellbot_relay",
    "shellbot_terminal",
];

/// One `target=level` directive per crate of the bot.
fn directive(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
