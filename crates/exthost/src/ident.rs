//! The shared proxy identifier tables.
//!
//! Both endpoints of a connection agree on these strings out of band; they
//! are part of the wire contract and must stay stable across versions.

use extrpc::ProxyId;

/// The host half of the command registry bridge. Registered on the host side,
/// called by the extension side.
pub const COMMAND_REGISTRY_HOST: ProxyId = ProxyId::new("command-registry-host");

/// The extension half of the command registry bridge. Registered on the
/// extension side, called by the host side.
pub const COMMAND_REGISTRY_EXT: ProxyId = ProxyId::new("command-registry-ext");
