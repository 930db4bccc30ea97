pub mod errors;
pub mod events;
pub mod id;
pub mod messenger;
pub mod types;

pub use errors::{ConfigError, ShellbotError, TransportError};
pub use events::{ChatEvent, InviteEvent, MessageContent, MessageEvent};
pub use id::{new_transaction_id, RoomId, UserId};
pub use messenger::{EventHandler, Messenger};
pub use types::AllowList;

pub type Result<T> = std::result::Result<T, ShellbotError>;
