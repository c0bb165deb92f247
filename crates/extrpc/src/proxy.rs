//! The caller-side handle to a remote service.
//!
//! A proxy carries no state beyond its target id. It exposes one generic
//! primitive, [`RpcProxy::invoke`]; typed per-service stubs forward each of
//! their declared methods through it, which keeps the typed contract while
//! preserving a single dispatch path.

use std::sync::Arc;

use serde_json::Value;

use crate::ident::ProxyId;
use crate::protocol::ProtocolInner;
use crate::protocol::Result;

/// A handle to the service registered under one [`ProxyId`] on the peer.
#[derive(Clone)]
pub struct RpcProxy {
    inner: Arc<ProtocolInner>,
    id: ProxyId,
}

impl RpcProxy {
    pub(crate) fn new(inner: Arc<ProtocolInner>, id: ProxyId) -> Self {
        Self { inner, id }
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    /// Sends one request and waits for its reply.
    ///
    /// Returns immediately pending; never blocks the caller's loop. Rejects
    /// with [`RpcError::Remote`](crate::RpcError::Remote) if the remote
    /// method failed, and with
    /// [`RpcError::TransportClosed`](crate::RpcError::TransportClosed) if the
    /// connection went away first.
    pub async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        self.inner.invoke(self.id, method, args).await
    }
}
