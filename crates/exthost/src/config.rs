//! Host-side configuration.

use std::time::Duration;

use extrpc::ProtocolConfig;

/// How the host half relays a command execution to the extension side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The host handler returns immediately; the notification runs in the
    /// background and an extension-side failure is only logged. Host command
    /// execution never blocks on extension latency.
    #[default]
    FireAndForget,
    /// The host execution resolves with the extension's outcome, errors
    /// included.
    Awaited,
}

/// Settings for one extension host connection.
#[derive(Clone, Debug, Default)]
pub struct HostConfig {
    pub execution_mode: ExecutionMode,
    /// Per-call timeout for the underlying protocol. `None` keeps calls
    /// pending until the reply arrives or the connection goes away.
    pub call_timeout: Option<Duration>,
}

impl HostConfig {
    pub(crate) fn protocol_config(&self) -> ProtocolConfig {
        ProtocolConfig { call_timeout: self.call_timeout }
    }
}
