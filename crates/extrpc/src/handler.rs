//! The inbound dispatch trait.
//!
//! Every service registered on a protocol instance funnels through one
//! generic entry point: `invoke(method, args)`. Typed services implement this
//! by matching on the method name and deserializing their own arguments,
//! which keeps a single dispatch path under the typed surface.

use serde_json::Value;

use extframe::RemoteError;

/// A locally registered implementation of one [`ProxyId`](crate::ProxyId).
///
/// A returned error becomes an error reply on the wire; the message survives,
/// the name is best-effort. Implementations should answer an unknown method
/// with a [`MethodNotFound`](extframe::names::METHOD_NOT_FOUND) error rather
/// than panicking.
#[async_trait::async_trait]
pub trait RpcHandler: Send + Sync + 'static {
    async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value, RemoteError>;
}
