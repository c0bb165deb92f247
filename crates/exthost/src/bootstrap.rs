//! Shared wiring for every hosting modality.
//!
//! A modality decides how the transport is built and where the extension loop
//! runs; everything else — installing the bridge halves, constructing the
//! API, the start/stop lifecycle — is this module.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use extrpc::ProtocolConfig;
use extrpc::RpcProtocol;
use extrpc::Transport;

use crate::api::PluginApi;
use crate::bridge::ext::CommandRegistryExt;
use crate::bridge::ext::HostCommandsProxy;
use crate::bridge::host::CommandRegistryHost;
use crate::bridge::host::ExtCommandsProxy;
use crate::command::CommandRegistry;
use crate::config::HostConfig;
use crate::ident::COMMAND_REGISTRY_EXT;
use crate::ident::COMMAND_REGISTRY_HOST;
use crate::plugin::Plugin;
use crate::plugin::PluginSet;

/// Installs the host half of the bridge on a host-side protocol instance.
pub fn install_host_side(
    protocol: &RpcProtocol,
    registry: Arc<CommandRegistry>,
    config: &HostConfig,
) -> Arc<CommandRegistryHost> {
    let ext = ExtCommandsProxy::new(protocol);
    let host = Arc::new(CommandRegistryHost::new(registry, ext, config.execution_mode));
    protocol.set(COMMAND_REGISTRY_HOST, host)
}

/// Installs the extension half on an extension-side protocol instance and
/// builds the API object handed to plugin `start` callbacks.
pub fn install_extension_side(protocol: &RpcProtocol) -> PluginApi {
    let host = HostCommandsProxy::new(protocol);
    let ext = CommandRegistryExt::new(host);
    protocol.set(COMMAND_REGISTRY_EXT, ext.clone());
    PluginApi::new(ext)
}

/// The extension-side main loop, shared by the worker and process modalities.
///
/// Starts every plugin, then runs until `shutdown` resolves or the connection
/// goes away, then stops the plugins in registration order and tears the
/// protocol down.
pub(crate) async fn run_extension_side(
    transport: Arc<dyn Transport>,
    config: ProtocolConfig,
    plugins: Vec<Box<dyn Plugin>>,
    shutdown: impl Future<Output = ()>,
) {
    let protocol = RpcProtocol::with_config(transport, config);
    let api = install_extension_side(&protocol);

    let mut plugins = PluginSet::new(plugins);
    plugins.start_all(&api).await;

    tokio::select! {
        _ = shutdown => debug!("extension host shutdown requested"),
        _ = protocol.closed() => debug!("extension host connection closed"),
    }

    plugins.stop_all().await;
    protocol.dispose();
}
