//! The in-process worker modality.
//!
//! Extension code runs on a dedicated thread with its own single-threaded
//! runtime, connected to the host by an in-process transport pair. True
//! parallelism exists between the two sides but not within either: each side
//! is one cooperative event loop, which is the concurrency model the whole
//! protocol assumes.

use std::sync::Arc;

use anyhow::Context;
use anyhow::anyhow;
use tokio::sync::oneshot;
use tracing::error;

use extrpc::PipeTransport;
use extrpc::RpcProtocol;

use crate::bootstrap::install_host_side;
use crate::bootstrap::run_extension_side;
use crate::command::CommandRegistry;
use crate::config::HostConfig;
use crate::plugin::Plugin;

/// A running worker-thread extension host.
pub struct WorkerHost {
    protocol: RpcProtocol,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl WorkerHost {
    /// Spawns the extension thread, wires both sides, and starts `plugins`
    /// inside the isolated context. Must be called from within a tokio
    /// runtime.
    pub fn spawn(
        registry: Arc<CommandRegistry>,
        config: HostConfig,
        plugins: Vec<Box<dyn Plugin>>,
    ) -> anyhow::Result<Self> {
        let (host_end, ext_end) = PipeTransport::pair();

        let protocol = RpcProtocol::with_config(Arc::new(host_end), config.protocol_config());
        install_host_side(&protocol, registry, &config);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let ext_config = config.protocol_config();

        let thread = std::thread::Builder::new()
            .name("extension-host".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!(error = %e, "failed to build extension host runtime");
                        return;
                    }
                };

                runtime.block_on(run_extension_side(
                    Arc::new(ext_end),
                    ext_config,
                    plugins,
                    async {
                        let _ = shutdown_rx.await;
                    },
                ));
            })
            .context("failed to spawn extension host thread")?;

        Ok(Self { protocol, shutdown: Some(shutdown_tx), thread: Some(thread) })
    }

    /// The host-side protocol instance, e.g. for registering further services
    /// on this connection.
    pub fn protocol(&self) -> &RpcProtocol {
        &self.protocol
    }

    /// Asks the extension side to stop (plugin `stop` callbacks run in
    /// registration order), waits for the thread to finish, and tears down
    /// the host side.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || thread.join())
                .await?
                .map_err(|_| anyhow!("extension host thread panicked"))?;
        }

        self.protocol.dispose();
        Ok(())
    }
}
