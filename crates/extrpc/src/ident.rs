//! String-keyed tokens identifying RPC-addressable services.
//!
//! A `ProxyId` is created once per service type, at module load, and shared by
//! both protocol endpoints: they must agree on the string out of band. The
//! discipline that makes this work: every id is unique across the services
//! multiplexed on one connection, and stable across versions. Renaming an id
//! breaks host/extension compatibility.

use std::fmt;

/// A typed token identifying one remotely callable service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProxyId {
    id: &'static str,
}

impl ProxyId {
    /// Creates a token. Intended for `const` tables shared by both sides.
    pub const fn new(id: &'static str) -> Self {
        Self { id }
    }

    pub fn as_str(&self) -> &'static str {
        self.id
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
