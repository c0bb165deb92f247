//! The child-process modality.
//!
//! The host spawns the manifest's resolved `node` entry with piped stdio and
//! speaks newline-delimited JSON frames over it. Inside the child,
//! [`run_process_extension`] is the whole program: frames over inherited
//! stdio until the host closes the pipe.
//!
//! Process exit is a bootstrap concern, not a protocol one: the core only
//! reports `closed()`, and this module decides what that means for the child.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::process::Command;
use tracing::info;
use tracing::warn;

use extrpc::LineTransport;
use extrpc::ProtocolConfig;
use extrpc::RpcProtocol;

use crate::bootstrap::install_host_side;
use crate::bootstrap::run_extension_side;
use crate::command::CommandRegistry;
use crate::config::HostConfig;
use crate::manifest::PluginManifest;
use crate::plugin::Plugin;

/// A running child-process extension host.
pub struct ProcessHost {
    protocol: RpcProtocol,
    child: tokio::process::Child,
}

impl std::fmt::Debug for ProcessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHost").finish_non_exhaustive()
    }
}

impl ProcessHost {
    /// Spawns the manifest's `node` entry as the isolated extension context
    /// and wires the host side. Entry paths resolve against `base_dir`.
    pub async fn spawn(
        registry: Arc<CommandRegistry>,
        config: HostConfig,
        manifest: &PluginManifest,
        base_dir: &Path,
    ) -> anyhow::Result<Self> {
        let entry = manifest.resolve_node(base_dir)?;

        let mut command = Command::new(&entry);
        let (child, transport) = LineTransport::spawn(&mut command)
            .with_context(|| format!("failed to spawn extension host '{}'", entry.display()))?;
        info!(plugin = %manifest.name, entry = %entry.display(), "spawned extension host process");

        let protocol = RpcProtocol::with_config(Arc::new(transport), config.protocol_config());
        install_host_side(&protocol, registry, &config);

        Ok(Self { protocol, child })
    }

    pub fn protocol(&self) -> &RpcProtocol {
        &self.protocol
    }

    /// Waits for the child to exit on its own, then tears down the host side.
    pub async fn wait(mut self) -> anyhow::Result<std::process::ExitStatus> {
        let status = self.child.wait().await?;
        self.protocol.dispose();
        Ok(status)
    }

    /// Closes the connection. The child sees EOF on stdin, runs its stop
    /// callbacks, and exits; after `grace` it is killed instead.
    pub async fn shutdown(self, grace: Duration) -> anyhow::Result<()> {
        let Self { protocol, mut child } = self;

        // Disposing drops every handle into the transport, which closes the
        // child's stdin.
        protocol.dispose();
        drop(protocol);

        match tokio::time::timeout(grace, child.wait()).await {
            Ok(status) => {
                status?;
            }
            Err(_) => {
                warn!("extension host did not exit within grace period, killing");
                child.kill().await?;
            }
        }
        Ok(())
    }
}

/// Entry point for extension host executables.
///
/// A `node`-entry binary builds its plugin set and hands control here; the
/// function returns once the host has closed the connection and the plugins
/// have stopped. Stdout belongs to the protocol — diagnostics must use
/// stderr.
pub async fn run_process_extension(plugins: Vec<Box<dyn Plugin>>) -> anyhow::Result<()> {
    let transport = Arc::new(LineTransport::stdio());
    run_extension_side(transport, ProtocolConfig::default(), plugins, std::future::pending()).await;
    Ok(())
}
