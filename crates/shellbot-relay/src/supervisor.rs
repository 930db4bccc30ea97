//! Keeps the transport's event loop running across transient failures.
//!
//! The retry policy is an explicit state machine ([`ConnectionState::next`])
//! so it can be tested without a network; [`ConnectionSupervisor::run`]
//! only performs the actions the machine asks for.

use std::future::Future;
use std::time::Duration;

use shellbot_common::{EventHandler, Messenger, TransportError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::SupervisorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Retrying,
    /// Terminal.
    Stopped,
}

#[derive(Debug)]
pub enum SupervisorEvent {
    /// The user interrupted the process.
    Interrupted,
    /// Another part of the bot asked everything to stop.
    StopRequested,
    /// The event loop returned without an error.
    ListenEnded,
    ListenFailed(TransportError),
    RetryElapsed,
}

#[derive(Debug)]
pub enum SupervisorAction {
    Listen,
    Wait(Duration),
    Exit,
    Fail(TransportError),
}

impl ConnectionState {
    /// The transition table.
    ///
    /// | from      | event                     | to        | action   |
    /// |-----------|---------------------------|-----------|----------|
    /// | Stopped   | any                       | Stopped   | Exit     |
    /// | any       | Interrupted/StopRequested | Stopped   | Exit     |
    /// | any       | ListenEnded               | Retrying  | Wait     |
    /// | any       | ListenFailed (transient)  | Retrying  | Wait     |
    /// | any       | ListenFailed (fatal)      | Stopped   | Fail     |
    /// | any       | RetryElapsed              | Connected | Listen   |
    pub fn next(self, event: SupervisorEvent, retry_delay: Duration) -> (Self, SupervisorAction) {
        use SupervisorAction as A;
        use SupervisorEvent as E;

        if self == Self::Stopped {
            return (Self::Stopped, A::Exit);
        }
        match event {
            E::Interrupted | E::StopRequested => (Self::Stopped, A::Exit),
            E::ListenEnded => (Self::Retrying, A::Wait(retry_delay)),
            E::ListenFailed(e) if e.is_transient() => (Self::Retrying, A::Wait(retry_delay)),
            E::ListenFailed(e) => (Self::Stopped, A::Fail(e)),
            E::RetryElapsed => (Self::Connected, A::Listen),
        }
    }
}

/// Owns the retry loop around [`Messenger::listen`].
pub struct ConnectionSupervisor {
    state: ConnectionState,
    retry_delay: Duration,
}

impl ConnectionSupervisor {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Connected,
            retry_delay,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    /// Listen until `interrupt` resolves, `stop` is cancelled, or the
    /// transport fails fatally. `stop` is cancelled on every exit path.
    pub async fn run<M, F>(
        &mut self,
        messenger: &M,
        handler: &dyn EventHandler,
        interrupt: F,
        stop: &CancellationToken,
    ) -> Result<(), SupervisorError>
    where
        M: Messenger + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        self.state = ConnectionState::Connected;
        let mut action = SupervisorAction::Listen;

        loop {
            let event = match action {
                SupervisorAction::Listen => tokio::select! {
                    _ = &mut interrupt => SupervisorEvent::Interrupted,
                    _ = stop.cancelled() => SupervisorEvent::StopRequested,
                    result = messenger.listen(handler) => match result {
                        Ok(()) => SupervisorEvent::ListenEnded,
                        Err(e) => SupervisorEvent::ListenFailed(e),
                    },
                },
                SupervisorAction::Wait(delay) => tokio::select! {
                    _ = &mut interrupt => SupervisorEvent::Interrupted,
                    _ = stop.cancelled() => SupervisorEvent::StopRequested,
                    _ = tokio::time::sleep(delay) => SupervisorEvent::RetryElapsed,
                },
                SupervisorAction::Exit => {
                    stop.cancel();
                    return Ok(());
                }
                SupervisorAction::Fail(e) => {
                    stop.cancel();
                    return Err(e.into());
                }
            };

            log_event(&event, self.retry_delay);
            let (state, next) = self.state.next(event, self.retry_delay);
            self.state = state;
            action = next;
        }
    }
}

fn log_event(event: &SupervisorEvent, retry_delay: Duration) {
    let secs = retry_delay.as_secs_f64();
    match event {
        SupervisorEvent::Interrupted => info!("interrupted, shutting down"),
        SupervisorEvent::StopRequested => info!("stop requested, shutting down"),
        SupervisorEvent::ListenEnded => warn!("event stream ended. Trying again in {secs}s..."),
        SupervisorEvent::ListenFailed(e) if matches!(e, TransportError::Timeout(_)) => {
            warn!(error = %e, "timeout. Trying again in {secs}s...");
        }
        SupervisorEvent::ListenFailed(e) if e.is_transient() => {
            warn!(error = %e, "disconnected. Trying again in {secs}s...");
        }
        SupervisorEvent::ListenFailed(e) => error!(error = %e, "transport failed"),
        SupervisorEvent::RetryElapsed => info!("reconnecting"),
    }
}
