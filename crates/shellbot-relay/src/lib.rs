//! The bridge between a shell and a chat transport.
//!
//! Output flows shell → [`OutputRelay`] (decode, batch, filter) → every
//! destination room. Input flows chat → [`InputRouter`] (authorize, parse)
//! → shell. [`ConnectionSupervisor`] keeps the transport's event loop alive
//! across transient network failures.

pub mod buffer;
pub mod error;
pub mod format;
pub mod relay;
pub mod router;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::OutputBuffer;
pub use error::{RelayError, SupervisorError};
pub use format::{render_block, RenderedMessage};
pub use relay::OutputRelay;
pub use router::{parse_command, Command, InputRouter, Routed};
pub use supervisor::{ConnectionState, ConnectionSupervisor, SupervisorAction, SupervisorEvent};
