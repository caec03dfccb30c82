//! Wire-message boundary: the codec and the reference message kind.
//!
//! The bus proper never looks inside a frame — this module exists at the
//! boundary where producers turn network traffic into
//! [`MessageReceived`](crate::Event::MessageReceived) /
//! [`MessageSent`](crate::Event::MessageSent) events.
//!
//! ## Contents
//! - [`codec`] — the length-prefixed recursive list encoding all messages share
//! - [`Command`] — the command-identifier byte opening every frame
//! - [`WireMessage`], [`GetBlockHashes`] — the shared message contract and
//!   its reference implementation (lazy parse from raw bytes, eager encode
//!   from typed fields)

pub mod codec;
mod command;
mod message;

pub use command::Command;
pub use message::{GetBlockHashes, WireMessage};
