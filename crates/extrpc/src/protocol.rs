//! # RPC Protocol Core
//!
//! [`RpcProtocol`] wraps one transport and multiplexes any number of services
//! over it. A pump task reads inbound payloads for the life of the
//! connection and splits them two ways:
//!
//! - **Requests** are dispatched to the locally registered instance for their
//!   proxy id. Every accepted request is answered with exactly one reply,
//!   success or error; an unknown proxy id or a panicking handler becomes an
//!   error reply, never a dead pump.
//! - **Replies** settle the pending entry matching their call id. Arrival
//!   order is irrelevant; correlation is by id alone.
//!
//! When the transport closes or the protocol is disposed, every outstanding
//! call is rejected. Without that, a lost connection would leave callers
//! pending forever.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Notify;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::warn;

use extframe::Envelope;
use extframe::RemoteError;
use extframe::names;

use crate::handler::RpcHandler;
use crate::ident::ProxyId;
use crate::proxy::RpcProxy;
use crate::transport::Transport;
use crate::transport::TransportError;

/// Errors surfaced to the caller of a proxy method.
#[derive(Debug)]
pub enum RpcError {
    /// The local envelope codec failed.
    Frame(extframe::Error),
    /// The transport refused the send.
    Transport(TransportError),
    /// The remote instance answered with an error reply.
    Remote(RemoteError),
    /// The connection went away while the call was outstanding.
    TransportClosed,
    /// The configured per-call timeout elapsed.
    Timeout,
    /// The protocol instance was disposed.
    Disposed,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "Frame error: {}", e),
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::Remote(e) => write!(f, "Remote error: {}", e),
            Self::TransportClosed => write!(f, "Transport closed with call outstanding"),
            Self::Timeout => write!(f, "Call timed out"),
            Self::Disposed => write!(f, "Protocol disposed"),
        }
    }
}

impl std::error::Error for RpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<extframe::Error> for RpcError {
    fn from(e: extframe::Error) -> Self {
        Self::Frame(e)
    }
}

impl From<TransportError> for RpcError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;

/// Tunables for one protocol instance.
#[derive(Clone, Debug, Default)]
pub struct ProtocolConfig {
    /// Maximum time to wait for a reply. `None` (the default) keeps a call
    /// pending until its reply arrives or the connection goes away.
    pub call_timeout: Option<Duration>,
}

/// One end of an RPC connection.
///
/// Cheap to clone; all clones share the same connection. Must be created
/// inside a tokio runtime (the pump is spawned in the constructor).
#[derive(Clone)]
pub struct RpcProtocol {
    inner: Arc<ProtocolInner>,
}

pub(crate) struct ProtocolInner {
    transport: Arc<dyn Transport>,
    locals: DashMap<String, Arc<dyn RpcHandler>>,
    pending: DashMap<u64, oneshot::Sender<Result<Value>>>,
    next_call_id: AtomicU64,
    config: ProtocolConfig,
    closed: AtomicBool,
    disposed: AtomicBool,
    closed_notify: Notify,
    pump: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl RpcProtocol {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, ProtocolConfig::default())
    }

    pub fn with_config(transport: Arc<dyn Transport>, config: ProtocolConfig) -> Self {
        let inner = Arc::new(ProtocolInner {
            transport,
            locals: DashMap::new(),
            pending: DashMap::new(),
            next_call_id: AtomicU64::new(1),
            config,
            closed: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            closed_notify: Notify::new(),
            pump: std::sync::Mutex::new(None),
        });

        let handle = tokio::spawn(pump(inner.clone()));
        *inner.pump.lock().unwrap() = Some(handle);

        Self { inner }
    }

    /// Registers `instance` as the local implementation for `id` and returns
    /// it, so call sites can register and keep the instance in one line.
    ///
    /// Re-registering an id is last-write-wins.
    pub fn set<T: RpcHandler>(&self, id: ProxyId, instance: Arc<T>) -> Arc<T> {
        let prev = self
            .inner
            .locals
            .insert(id.as_str().to_string(), instance.clone());
        if prev.is_some() {
            debug!(proxy = %id, "replacing registered instance");
        }
        instance
    }

    /// Returns a handle to the service registered under `id` on the other
    /// side. Constructing the proxy is local and infallible; whether anything
    /// answers is discovered per call.
    pub fn get_proxy(&self, id: ProxyId) -> RpcProxy {
        RpcProxy::new(self.inner.clone(), id)
    }

    /// True once the pump has stopped, for any reason.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Resolves when the connection has gone away or the protocol has been
    /// disposed. Bootstrap layers use this to drive teardown.
    pub async fn closed(&self) {
        loop {
            if self.is_closed() {
                return;
            }
            let notified = self.inner.closed_notify.notified();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }

    /// Tears the instance down: stops the pump and rejects every outstanding
    /// call with [`RpcError::Disposed`]. Idempotent.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::Release);
        if let Some(handle) = self.inner.pump.lock().unwrap().take() {
            handle.abort();
        }
        self.inner.close();
    }
}

async fn pump(inner: Arc<ProtocolInner>) {
    loop {
        match inner.transport.recv().await {
            Ok(Some(payload)) => inner.handle_inbound(payload),
            Ok(None) => {
                debug!("transport closed by peer");
                break;
            }
            Err(e) => {
                warn!(error = %e, "transport receive failed");
                break;
            }
        }
    }
    inner.close();
}

impl ProtocolInner {
    /// The error outstanding and future calls observe once the instance is
    /// down.
    fn close_error(&self) -> RpcError {
        if self.disposed.load(Ordering::Acquire) {
            RpcError::Disposed
        } else {
            RpcError::TransportClosed
        }
    }

    /// Marks the instance closed and rejects every pending call. Safe to call
    /// more than once; later calls only drain entries that raced in.
    fn close(&self) {
        self.closed.store(true, Ordering::Release);

        let outstanding: Vec<u64> = self.pending.iter().map(|e| *e.key()).collect();
        for call_id in outstanding {
            if let Some((_, tx)) = self.pending.remove(&call_id) {
                let _ = tx.send(Err(self.close_error()));
            }
        }

        // Registered instances often hold proxies back into this protocol;
        // dropping them here breaks that cycle so the transport can be freed.
        self.locals.clear();

        self.closed_notify.notify_waiters();
    }

    pub(crate) async fn invoke(
        self: &Arc<Self>,
        id: ProxyId,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value> {
        if self.closed.load(Ordering::Acquire) {
            return Err(self.close_error());
        }

        let call_id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(call_id, tx);

        // The pump may have shut down between the check above and the insert;
        // re-checking after the insert means no entry can be stranded.
        if self.closed.load(Ordering::Acquire) {
            self.pending.remove(&call_id);
            return Err(self.close_error());
        }

        let frame = Envelope::request(call_id, id.as_str(), method, args);
        let bytes = match frame.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.pending.remove(&call_id);
                return Err(RpcError::Frame(e));
            }
        };

        if let Err(e) = self.transport.send(&bytes).await {
            self.pending.remove(&call_id);
            return Err(RpcError::Transport(e));
        }

        let settled = match self.config.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(settled) => settled,
                Err(_) => {
                    self.pending.remove(&call_id);
                    return Err(RpcError::Timeout);
                }
            },
            None => rx.await,
        };

        match settled {
            Ok(outcome) => outcome,
            // Sender dropped without a verdict; treat as connection loss.
            Err(_) => Err(self.close_error()),
        }
    }

    fn handle_inbound(self: &Arc<Self>, payload: Vec<u8>) {
        let frame = match Envelope::decode(&payload) {
            Ok(frame) => frame,
            Err(e) => {
                // Forward compatibility: an unreadable frame is skipped, not
                // allowed to take down every in-flight call on this pump.
                warn!(error = %e, "skipping undecodable frame");
                return;
            }
        };

        match frame {
            Envelope::Request { call_id, proxy_id, method, args } => {
                self.dispatch_request(call_id, proxy_id, method, args);
            }
            Envelope::Reply { call_id, result, error } => {
                self.settle_reply(call_id, result, error);
            }
        }
    }

    fn settle_reply(&self, call_id: u64, result: Option<Value>, error: Option<RemoteError>) {
        let Some((_, tx)) = self.pending.remove(&call_id) else {
            // Late, duplicate, or never ours. Correlation failed, nothing to
            // settle.
            warn!(call_id, "reply for unknown call id");
            return;
        };

        let outcome = match error {
            Some(remote) => Err(RpcError::Remote(remote)),
            None => Ok(result.unwrap_or(Value::Null)),
        };
        let _ = tx.send(outcome);
    }

    fn dispatch_request(self: &Arc<Self>, call_id: u64, proxy_id: String, method: String, args: Vec<Value>) {
        let Some(handler) = self.locals.get(&proxy_id).map(|entry| entry.value().clone()) else {
            let error = RemoteError::with_name(
                names::UNKNOWN_PROXY,
                format!("no instance registered for proxy '{}'", proxy_id),
            );
            self.spawn_reply(Envelope::reply_err(call_id, error));
            return;
        };

        let inner = self.clone();
        tokio::spawn(async move {
            // The invocation runs in its own task so that a panicking handler
            // still settles the caller with an error reply.
            let invocation = tokio::spawn({
                let handler = handler.clone();
                let method = method.clone();
                async move { handler.invoke(&method, args).await }
            });

            let reply = match invocation.await {
                Ok(Ok(result)) => Envelope::reply_ok(call_id, result),
                Ok(Err(remote)) => Envelope::reply_err(call_id, remote),
                Err(join_error) => Envelope::reply_err(
                    call_id,
                    RemoteError::with_name(
                        names::REMOTE_METHOD_THREW,
                        format!("method '{}' panicked: {}", method, join_error),
                    ),
                ),
            };

            inner.send_frame(reply).await;
        });
    }

    fn spawn_reply(self: &Arc<Self>, frame: Envelope) {
        let inner = self.clone();
        tokio::spawn(async move {
            inner.send_frame(frame).await;
        });
    }

    async fn send_frame(&self, frame: Envelope) {
        let bytes = match frame.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to encode reply");
                return;
            }
        };
        if let Err(e) = self.transport.send(&bytes).await {
            warn!(error = %e, "failed to send reply");
        }
    }
}
