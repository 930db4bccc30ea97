//! The output relay: shell output → chat messages.

use std::sync::Arc;
use std::time::Duration;

use shellbot_common::{Messenger, RoomId};
use shellbot_config::{ConnectionConfig, RelayConfig};
use shellbot_terminal::{OutputEvent, ShellOutput};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::buffer::OutputBuffer;
use crate::error::RelayError;
use crate::format::render_block;

/// Drains the shell's output and posts it to every destination room.
///
/// Output is sent as soon as the shell has been quiet for one poll interval,
/// or earlier in newline-aligned pieces when it grows past the message size
/// limit. While no room is available output keeps accumulating.
///
/// A block that fails to reach a room with a transient transport error is
/// retried to that room after the retry delay before the next block goes
/// out, so rooms never see output out of order.
pub struct OutputRelay<M: Messenger + ?Sized> {
    messenger: Arc<M>,
    buffer: OutputBuffer,
    poll_interval: Duration,
    retry_delay: Duration,
}

impl<M: Messenger + ?Sized> OutputRelay<M> {
    pub fn new(messenger: Arc<M>, config: &RelayConfig) -> Self {
        Self {
            messenger,
            buffer: OutputBuffer::new(config.max_message_bytes),
            poll_interval: config.poll_interval(),
            retry_delay: ConnectionConfig::default().retry_delay(),
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Run until `stop` is cancelled or the shell's output ends.
    ///
    /// Cancels `stop` on the way out so the rest of the bot shuts down with
    /// it. A read failure other than hang-up is returned as an error.
    pub async fn run(
        mut self,
        mut output: ShellOutput,
        stop: CancellationToken,
    ) -> Result<(), RelayError> {
        info!("output relay started");

        let result = loop {
            let readable = tokio::select! {
                biased;
                _ = stop.cancelled() => break Ok(()),
                polled = tokio::time::timeout(self.poll_interval, output.recv()) => match polled {
                    Ok(Some(OutputEvent::Data(chunk))) => {
                        self.buffer.push(chunk);
                        true
                    }
                    Ok(Some(OutputEvent::Closed)) | Ok(None) => {
                        info!("shell output closed");
                        self.finish(&stop).await;
                        break Ok(());
                    }
                    Ok(Some(OutputEvent::Failed(e))) => break Err(RelayError::Read(e)),
                    Err(_) => false,
                },
            };

            // Only an idle poll flushes; fresh data only goes out over the size limit.
            self.cycle(!readable, &stop).await;
        };

        stop.cancel();
        info!("output relay stopped");
        result
    }

    async fn cycle(&mut self, flush: bool, stop: &CancellationToken) {
        if self.buffer.is_empty() {
            return;
        }
        let rooms = self.messenger.destinations();
        if rooms.is_empty() {
            return;
        }
        for block in self.buffer.evaluate(flush) {
            self.send(&rooms, &block, stop).await;
        }
    }

    async fn finish(&mut self, stop: &CancellationToken) {
        let rooms = self.messenger.destinations();
        if rooms.is_empty() {
            if !self.buffer.is_empty() {
                warn!(bytes = self.buffer.len(), "no room to receive final shell output");
            }
            return;
        }
        let block = self.buffer.finish();
        self.send(&rooms, &block, stop).await;
    }

    /// Deliver one block to every room. Returns once each room has either
    /// accepted it or failed permanently, or when `stop` is cancelled.
    async fn send(&self, rooms: &[RoomId], block: &str, stop: &CancellationToken) {
        let Some(message) = render_block(block) else {
            return;
        };
        debug!(bytes = message.plain.len(), "shell stdout: {}", message.plain);

        let mut pending: Vec<&RoomId> = rooms.iter().collect();
        loop {
            let mut retry = Vec::new();
            for room in pending {
                match self
                    .messenger
                    .deliver(room, &message.plain, &message.html)
                    .await
                {
                    Ok(()) => {}
                    Err(e) if e.is_transient() => {
                        warn!(
                            room = %room,
                            error = %e,
                            "delivery failed. Trying again in {}s...",
                            self.retry_delay.as_secs_f64()
                        );
                        retry.push(room);
                    }
                    Err(e) => warn!(room = %room, error = %e, "failed to deliver shell output"),
                }
            }
            if retry.is_empty() {
                return;
            }
            pending = retry;

            tokio::select! {
                _ = stop.cancelled() => {
                    warn!(rooms = pending.len(), "stopping with undelivered shell output");
                    return;
                }
                _ = tokio::time::sleep(self.retry_delay) => {}
            }
        }
    }
}
