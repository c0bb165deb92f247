//! # ExtFrame
//!
//! The wire envelope for the extension RPC protocol.
//!
//! Every message on a connection is one of two frames:
//! - `request`: `{ callId, proxyId, method, args }`
//! - `reply`:   `{ callId, result | error }`
//!
//! Frames are JSON objects discriminated by a `type` field, so they survive
//! any channel that can carry JSON text: an in-process pipe, a child process's
//! stdio, or a socket. Correlation is by `callId` only; arrival order of
//! replies carries no meaning.
//!
//! ## Forward compatibility
//!
//! Decoding tolerates unknown extra fields in any frame. Two independently
//! built endpoints interoperate as long as they agree on the discriminant and
//! the correlation contract.

mod envelope;
mod error;

#[cfg(test)]
mod tests;

pub use crate::envelope::Envelope;
pub use crate::envelope::RemoteError;
pub use crate::envelope::names;

pub use crate::error::Error;
pub use crate::error::Result;
