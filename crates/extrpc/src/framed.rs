//! Newline-delimited framing over any byte stream.
//!
//! One payload per line. Payloads are JSON envelopes, and JSON escapes control
//! characters, so a payload can never contain a raw `\n` of its own. This is
//! the framing for the two out-of-process backings:
//!
//! - **Child process**: the host spawns the extension executable with piped
//!   stdio ([`LineTransport::spawn`]); inside the child,
//!   [`LineTransport::stdio`] speaks over the inherited handles.
//! - **Socket**: [`LineTransport::connect`] / [`LineTransport::from_stream`]
//!   run the same framing over TCP.

use std::io;
use std::process::Stdio;

use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::io::Lines;
use tokio::net::TcpStream;
use tokio::net::ToSocketAddrs;
use tokio::process::Child;
use tokio::process::Command;
use tokio::sync::Mutex;

use crate::transport;
use crate::transport::Transport;
use crate::transport::TransportError;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A line-framed transport over an arbitrary reader/writer pair.
pub struct LineTransport {
    writer: Mutex<BoxedWriter>,
    lines: Mutex<Lines<BufReader<BoxedReader>>>,
}

impl LineTransport {
    /// Wraps a raw reader/writer pair.
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        let reader: BoxedReader = Box::new(reader);
        Self {
            writer: Mutex::new(Box::new(writer)),
            lines: Mutex::new(BufReader::new(reader).lines()),
        }
    }

    /// The extension side of the child-process modality: speaks over this
    /// process's own stdin/stdout.
    ///
    /// Stdout is reserved for frames once this is constructed; diagnostics
    /// must go to stderr.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }

    /// The host side of the child-process modality: spawns `command` with
    /// piped stdin/stdout and frames over them. Stderr is inherited so the
    /// child's diagnostics reach the host's stderr.
    pub fn spawn(command: &mut Command) -> io::Result<(Child, Self)> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("child stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout not captured"))?;

        Ok((child, Self::new(stdout, stdin)))
    }

    /// Connects to a listening peer over TCP.
    pub async fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        Ok(Self::from_stream(TcpStream::connect(addr).await?))
    }

    /// Frames over an already established TCP stream (e.g. from an acceptor).
    pub fn from_stream(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self::new(read_half, write_half)
    }
}

fn io_error(e: io::Error) -> TransportError {
    match e.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::UnexpectedEof => TransportError::ConnectionLost(e.to_string()),
        _ => TransportError::Io(e.to_string()),
    }
}

#[async_trait::async_trait]
impl Transport for LineTransport {
    async fn send(&self, payload: &[u8]) -> transport::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(payload).await.map_err(io_error)?;
        writer.write_all(b"\n").await.map_err(io_error)?;
        writer.flush().await.map_err(io_error)
    }

    async fn recv(&self) -> transport::Result<Option<Vec<u8>>> {
        let mut lines = self.lines.lock().await;
        loop {
            match lines.next_line().await.map_err(io_error)? {
                Some(line) if line.is_empty() => continue,
                Some(line) => return Ok(Some(line.into_bytes())),
                None => return Ok(None),
            }
        }
    }
}
