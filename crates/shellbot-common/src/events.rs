use serde::{Deserialize, Serialize};

use crate::id::{RoomId, UserId};

/// An inbound event from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    Message(MessageEvent),
    Invite(InviteEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub room: RoomId,
    pub sender: UserId,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain text body.
    Text { body: String },
    /// Any other message type (notices, images, ...), kept for logging.
    Other { msgtype: String },
}

impl MessageEvent {
    pub fn text(room: impl Into<String>, sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            room: RoomId::new(room),
            sender: UserId::new(sender),
            content: MessageContent::Text { body: body.into() },
        }
    }

    /// The body, if this is a plain-text message.
    pub fn text_body(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { body } => Some(body),
            MessageContent::Other { .. } => None,
        }
    }
}

/// An invitation into a room.
///
/// `inviter` is `None` when the invite state did not name who sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteEvent {
    pub room: RoomId,
    pub invitee: UserId,
    pub inviter: Option<UserId>,
}
