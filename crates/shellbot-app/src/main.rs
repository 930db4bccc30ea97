mod cli;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

use shellbot_common::{AllowList, ShellbotError};
use shellbot_config::BotConfig;
use shellbot_matrix::{MatrixClient, MatrixConfig};
use shellbot_relay::{ConnectionSupervisor, InputRouter, OutputRelay, SupervisorError};
use shellbot_terminal::spawn_shell;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let config = match shellbot_config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("shellbot: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(
        args.log_level
            .as_deref()
            .unwrap_or(config.logging.level.as_str()),
    );
    info!("shellbot v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(args, config).await {
        Ok(()) => {
            info!("shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: cli::Args, mut config: BotConfig) -> shellbot_common::Result<()> {
    if let Some(program) = args.shell {
        config.shell.program = program;
    }
    let allow = AllowList::new(args.authorize);
    if allow.is_empty() {
        return Err(ShellbotError::Other("no authorized users given".into()));
    }
    info!(users = allow.len(), "authorized users loaded");

    let mut shell = spawn_shell(&config.shell, config.relay.read_chunk_bytes)
        .map_err(|e| ShellbotError::Terminal(e.to_string()))?;
    let output = shell
        .take_output()
        .ok_or_else(|| ShellbotError::Terminal("shell output already taken".into()))?;
    info!(program = %config.shell.program, "shell started");

    let client = Arc::new(
        MatrixClient::login(&MatrixConfig {
            homeserver: args.homeserver,
            username: args.username,
            password: args.password,
            sync_timeout: config.connection.sync_timeout(),
            request_timeout: config.connection.request_timeout(),
        })
        .await?,
    );

    let router = InputRouter::new(allow, shell.input(), Arc::clone(&client));
    // Accept invitations that arrived while offline; skip old messages.
    client.prime(&router).await?;

    let stop = CancellationToken::new();
    let relay = OutputRelay::new(Arc::clone(&client), &config.relay)
        .with_retry_delay(config.connection.retry_delay());
    let relay_task = tokio::spawn(
        relay
            .run(output, stop.clone())
            .instrument(info_span!("relay")),
    );

    let mut supervisor = ConnectionSupervisor::new(config.connection.retry_delay());
    let supervised = supervisor
        .run(client.as_ref(), &router, interrupt(), &stop)
        .instrument(info_span!("supervisor"))
        .await;

    stop.cancel();
    if shell.is_alive() {
        shell.kill();
    }
    let relayed = relay_task.await;

    if let Err(SupervisorError::Transport(e)) = supervised {
        return Err(e.into());
    }
    match relayed {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ShellbotError::Relay(e.to_string())),
        Err(e) => Err(ShellbotError::Other(format!("relay task failed: {e}"))),
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("interrupted"),
        Err(e) => {
            error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    }
}
