//! # ExtRPC
//!
//! Turns a duplex message channel into a set of bidirectional typed proxies.
//!
//! ## Architecture
//!
//! - **Transport**: an ordered, exactly-once byte conduit. Three backings:
//!   an in-process pair ([`PipeTransport`]), child-process stdio, and TCP
//!   (both via [`LineTransport`]).
//! - **Protocol**: [`RpcProtocol`] owns one transport and a pump task. Local
//!   service instances register under a [`ProxyId`]; remote services are
//!   reached through [`RpcProxy`], whose single `invoke` primitive every
//!   typed stub forwards through.
//! - **Correlation**: each call gets a fresh monotonic call id; replies settle
//!   the matching pending entry regardless of arrival order.
//!
//! ## Invariants
//!
//! - Every accepted request produces exactly one reply, success or error.
//! - A call id is never reused within a protocol instance.
//! - The pump never dies because of a bad frame; it only stops when the
//!   transport closes or the protocol is disposed, and then every outstanding
//!   call is rejected.

pub mod framed;
pub mod handler;
pub mod ident;
pub mod pipe;
pub mod protocol;
pub mod proxy;
pub mod transport;


pub use crate::framed::LineTransport;
pub use crate::handler::RpcHandler;
pub use crate::ident::ProxyId;
pub use crate::pipe::PipeTransport;
pub use crate::protocol::ProtocolConfig;
pub use crate::protocol::Result;
pub use crate::protocol::RpcError;
pub use crate::protocol::RpcProtocol;
pub use crate::proxy::RpcProxy;
pub use crate::transport::Transport;
pub use crate::transport::TransportError;
