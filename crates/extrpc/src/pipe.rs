//! In-process transport pair, the worker-messaging backing.
//!
//! Payload buffers move between the two endpoints by ownership, so nothing is
//! re-encoded on the way through. Also the transport of choice in tests.

use tokio::sync::Mutex;
use tokio::sync::mpsc;

use crate::transport;
use crate::transport::Transport;
use crate::transport::TransportError;

/// One endpoint of an in-process duplex channel.
///
/// Dropping an endpoint closes the channel: the peer's `recv` returns
/// `Ok(None)` and its `send` starts failing.
pub struct PipeTransport {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl PipeTransport {
    /// Creates two connected endpoints.
    ///
    /// Payloads sent on one appear on the other, in send order.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();

        let a = Self { tx: tx_a, rx: Mutex::new(rx_b) };
        let b = Self { tx: tx_b, rx: Mutex::new(rx_a) };
        (a, b)
    }
}

#[async_trait::async_trait]
impl Transport for PipeTransport {
    async fn send(&self, payload: &[u8]) -> transport::Result<()> {
        self.tx
            .send(payload.to_vec())
            .map_err(|_| TransportError::ConnectionLost("pipe peer dropped".into()))
    }

    async fn recv(&self) -> transport::Result<Option<Vec<u8>>> {
        Ok(self.rx.lock().await.recv().await)
    }
}
