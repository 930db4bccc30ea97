//! Shell channel types: the input half, the output events, and errors.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::warn;

/// Errors originating from PTY operations.
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to spawn shell: {0}")]
    SpawnFailed(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// One observation from the PTY reader thread.
#[derive(Debug)]
pub enum OutputEvent {
    /// Up to one read's worth of raw output.
    Data(Vec<u8>),
    /// The shell side hung up. No further events follow.
    Closed,
    /// Reading failed for a reason other than hang-up. No further events follow.
    Failed(std::io::Error),
}

/// Receiving half of the shell's output stream.
pub type ShellOutput = mpsc::UnboundedReceiver<OutputEvent>;

/// Writing half of the shell's input stream.
///
/// Cloneable. Each [`send`](Self::send) writes and flushes while holding the
/// lock, so concurrent senders never interleave partial messages.
#[derive(Clone)]
pub struct ShellInput {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ShellInput {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Write `data` to the shell and flush it immediately.
    pub fn send(&self, data: &[u8]) -> Result<(), PtyError> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| {
            warn!("shell input lock was poisoned, recovering");
            e.into_inner()
        });
        writer.write_all(data)?;
        writer.flush()?;
        Ok(())
    }

    /// [`send`](Self::send) on the blocking pool, for async callers.
    ///
    /// A shell that stops reading its input blocks the write; this keeps
    /// that stall off the runtime's worker threads.
    pub async fn write(&self, data: Vec<u8>) -> Result<(), PtyError> {
        let input = self.clone();
        tokio::task::spawn_blocking(move || input.send(&data))
            .await
            .map_err(|e| PtyError::IoError(std::io::Error::other(e)))?
    }
}
