//! The seam between the shell relay and a chat transport.

use async_trait::async_trait;

use crate::errors::TransportError;
use crate::events::ChatEvent;
use crate::id::{RoomId, UserId};

/// A chat transport the bot is logged in to.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// The identity this session is logged in as.
    fn user_id(&self) -> &UserId;

    /// Rooms that currently receive shell output.
    fn destinations(&self) -> Vec<RoomId>;

    /// Send one message with a plain body and an HTML-formatted body.
    async fn deliver(&self, room: &RoomId, plain: &str, formatted: &str)
        -> Result<(), TransportError>;

    /// Join a room the bot was invited to.
    async fn join(&self, room: &RoomId) -> Result<(), TransportError>;

    /// Receive events until the connection fails.
    ///
    /// Events are handed to `handler` one at a time, in arrival order.
    async fn listen(&self, handler: &dyn EventHandler) -> Result<(), TransportError>;
}

/// Receives inbound chat events from [`Messenger::listen`].
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: ChatEvent);
}
