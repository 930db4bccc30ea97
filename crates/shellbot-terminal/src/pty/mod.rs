//! PTY management using the `portable-pty` crate.
//!
//! The shell runs on the slave side of a pseudo-terminal. Its output is read
//! on a background thread and forwarded as [`OutputEvent`]s, so the relay
//! can wait on it with a timeout from async code.

mod types;

pub use types::*;

use std::io::{ErrorKind, Read};
use std::thread;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use shellbot_config::ShellConfig;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Linux and macOS report a hung-up PTY master as `EIO` rather than EOF.
#[cfg(unix)]
const EIO: i32 = 5;

// =============================================================================
// SHELL PROCESS
// =============================================================================

/// A shell running under a PTY.
///
/// Owns the child process and the master side of the PTY pair. The output
/// half can be taken exactly once; the input half can be cloned freely.
pub struct ShellProcess {
    input: ShellInput,
    output: Option<ShellOutput>,
    child: Box<dyn Child + Send + Sync>,
    _master: Box<dyn MasterPty + Send>,
}

impl ShellProcess {
    /// A handle for writing to the shell.
    pub fn input(&self) -> ShellInput {
        self.input.clone()
    }

    /// Take the output stream. Returns `None` after the first call.
    pub fn take_output(&mut self) -> Option<ShellOutput> {
        self.output.take()
    }

    /// Returns `true` if the shell is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Kill the shell.
    pub fn kill(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("shell kill error (may already be dead): {e}");
        }
    }
}

impl Drop for ShellProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

// =============================================================================
// SPAWN
// =============================================================================

fn build_shell_command(config: &ShellConfig) -> CommandBuilder {
    let mut cmd = CommandBuilder::new(&config.program);
    cmd.args(&config.args);
    for (key, value) in &config.env {
        cmd.env(key, value);
    }
    cmd.env("TERM", &config.term);
    cmd
}

/// Spawn the configured shell inside a new PTY.
///
/// The reader thread reads at most `read_chunk` bytes at a time.
pub fn spawn_shell(config: &ShellConfig, read_chunk: usize) -> Result<ShellProcess, PtyError> {
    let pty_system = native_pty_system();

    let pair = pty_system
        .openpty(PtySize {
            rows: config.rows,
            cols: config.cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| PtyError::SpawnFailed(format!("failed to open PTY: {e}")))?;

    let child = pair
        .slave
        .spawn_command(build_shell_command(config))
        .map_err(|e| PtyError::SpawnFailed(format!("'{}': {e}", config.program)))?;

    // Only the master side is needed from here on.
    drop(pair.slave);

    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| PtyError::SpawnFailed(format!("failed to clone PTY reader: {e}")))?;

    let writer = pair
        .master
        .take_writer()
        .map_err(|e| PtyError::SpawnFailed(format!("failed to take PTY writer: {e}")))?;

    let (tx, rx) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("shell-reader".into())
        .spawn(move || read_loop(reader, read_chunk, &tx))
        .map_err(|e| PtyError::SpawnFailed(format!("failed to spawn reader thread: {e}")))?;

    info!(program = %config.program, term = %config.term, "shell spawned");

    Ok(ShellProcess {
        input: ShellInput::new(writer),
        output: Some(rx),
        child,
        _master: pair.master,
    })
}

// =============================================================================
// READER
// =============================================================================

/// Forward reads from `reader` until it ends, fails, or nobody is listening.
pub(crate) fn read_loop<R: Read>(
    mut reader: R,
    read_chunk: usize,
    tx: &mpsc::UnboundedSender<OutputEvent>,
) {
    let mut buf = vec![0u8; read_chunk.max(1)];
    loop {
        let event = match reader.read(&mut buf) {
            Ok(0) => OutputEvent::Closed,
            Ok(n) => OutputEvent::Data(buf[..n].to_vec()),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_hangup(&e) => OutputEvent::Closed,
            Err(e) => OutputEvent::Failed(e),
        };

        let last = !matches!(event, OutputEvent::Data(_));
        if tx.send(event).is_err() || last {
            debug!("shell reader exiting");
            break;
        }
    }
}

fn is_hangup(e: &std::io::Error) -> bool {
    #[cfg(unix)]
    {
        e.raw_os_error() == Some(EIO)
    }
    #[cfg(not(unix))]
    {
        e.kind() == ErrorKind::BrokenPipe
    }
}

// =============================================================================
// TESTS
// =============================================================================
