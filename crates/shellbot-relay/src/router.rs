//! The input router: chat messages → shell input.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use shellbot_common::{AllowList, ChatEvent, EventHandler, InviteEvent, Messenger, MessageEvent, RoomId};
use shellbot_terminal::ShellInput;
use tracing::{debug, info, warn};

/// The byte a terminal sends for ctrl+c.
const INTERRUPT: u8 = 0x03;

// Both forms match at the start of the message only; `.` stops at the first newline.
static CTRL_C_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^!?(?:shell )?ctrl[+-]?c")
        .expect("router: static regex pattern must compile")
});

static SHELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^!?shell (.*)").expect("router: static regex pattern must compile")
});

/// A chat message understood as shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send ctrl+c to the foreground process.
    Interrupt,
    /// Type a line into the shell.
    Shell(String),
}

/// Parse a message body. Interrupt spellings win over the shell form, so
/// `!shell ctrl+c` interrupts rather than running a command named `ctrl+c`.
pub fn parse_command(body: &str) -> Option<Command> {
    if CTRL_C_RE.is_match(body) {
        return Some(Command::Interrupt);
    }
    SHELL_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| Command::Shell(m.as_str().to_string()))
}

/// What [`InputRouter::route`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Ignored,
    Interrupted,
    Forwarded(String),
    Joined(RoomId),
    Failed,
}

/// Authorizes inbound events and turns accepted ones into shell input or
/// room joins. Unauthorized or unrecognized events are dropped silently.
pub struct InputRouter<M: Messenger + ?Sized> {
    allow: AllowList,
    input: ShellInput,
    messenger: Arc<M>,
}

impl<M: Messenger + ?Sized> InputRouter<M> {
    pub fn new(allow: AllowList, input: ShellInput, messenger: Arc<M>) -> Self {
        Self {
            allow,
            input,
            messenger,
        }
    }

    pub async fn route(&self, event: ChatEvent) -> Routed {
        match event {
            ChatEvent::Message(msg) => self.on_message(&msg).await,
            ChatEvent::Invite(invite) => self.on_invite(&invite).await,
            ChatEvent::Other => Routed::Ignored,
        }
    }

    async fn on_message(&self, msg: &MessageEvent) -> Routed {
        if !self.allow.contains(&msg.sender) {
            return Routed::Ignored;
        }
        let Some(body) = msg.text_body() else {
            return Routed::Ignored;
        };

        match parse_command(body) {
            Some(Command::Interrupt) => {
                info!(sender = %msg.sender, "sending ctrl+c");
                match self.input.write(vec![INTERRUPT]).await {
                    Ok(()) => Routed::Interrupted,
                    Err(e) => {
                        warn!(error = %e, "failed to write ctrl+c to shell");
                        Routed::Failed
                    }
                }
            }
            Some(Command::Shell(line)) => {
                info!(sender = %msg.sender, "shell stdin: {line}");
                let mut data = line.clone().into_bytes();
                data.push(b'\n');
                match self.input.write(data).await {
                    Ok(()) => Routed::Forwarded(line),
                    Err(e) => {
                        warn!(error = %e, "failed to write to shell");
                        Routed::Failed
                    }
                }
            }
            None => Routed::Ignored,
        }
    }

    async fn on_invite(&self, invite: &InviteEvent) -> Routed {
        if invite.invitee != *self.messenger.user_id() {
            return Routed::Ignored;
        }
        let Some(inviter) = invite.inviter.as_ref().filter(|u| self.allow.contains(u)) else {
            debug!(room = %invite.room, inviter = ?invite.inviter, "ignoring invitation");
            return Routed::Ignored;
        };

        info!(room = %invite.room, inviter = %inviter, "joining room on invitation");
        match self.messenger.join(&invite.room).await {
            Ok(()) => Routed::Joined(invite.room.clone()),
            Err(e) => {
                warn!(room = %invite.room, error = %e, "failed to join room");
                Routed::Failed
            }
        }
    }
}

#[async_trait]
impl<M: Messenger + ?Sized> EventHandler for InputRouter<M> {
    async fn handle(&self, event: ChatEvent) {
        self.route(event).await;
    }
}
