//! # Transport Abstraction
//!
//! A minimal, async interface for moving opaque payloads between the host and
//! an isolated extension context.
//!
//! ## Philosophy
//!
//! - **Byte-Oriented**: the transport knows nothing about envelopes or call
//!   ids. It moves buffers.
//! - **Ordered, exactly-once**: payloads arrive in send order, exactly the
//!   payloads the peer passed to `send`, with no silent drops while the
//!   channel is up.
//! - **No policy**: a closed channel fails future sends and ends `recv`, but
//!   the transport never fails pending calls itself. That belongs to the
//!   protocol layer.

use std::fmt;

/// Errors that occur at the channel layer.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// The peer is unreachable or the channel was dropped.
    ConnectionLost(String),
    /// Generic I/O error or internal transport failure.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionLost(msg) => write!(f, "Connection lost: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

pub type Result<T> = std::result::Result<T, TransportError>;

/// A duplex, ordered message channel.
///
/// Object-safe (`Arc<dyn Transport>`). `send` may be called concurrently from
/// many tasks; `recv` is consumed by a single pump.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Queues one payload for the peer.
    async fn send(&self, payload: &[u8]) -> Result<()>;

    /// Waits for the next payload from the peer.
    ///
    /// Returns `Ok(None)` when the channel has closed cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>>;
}
