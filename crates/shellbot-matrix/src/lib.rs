//! Matrix client-server API transport.
//!
//! Implements [`shellbot_common::Messenger`] on top of the v3 REST endpoints:
//! password login, long-poll `/sync`, room send and room join. Only the
//! slice of the protocol the bot needs is modelled.

mod client;
mod error;
mod sync;

pub use client::{MatrixClient, MatrixConfig};
pub use sync::SyncResponse;
