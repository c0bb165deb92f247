//! The plugin contract.

use tracing::warn;

use crate::api::PluginApi;

/// One loadable extension.
///
/// `start` receives the constructed API object; registrations made there stay
/// alive until their disposables fire or the host shuts the context down.
#[async_trait::async_trait]
pub trait Plugin: Send + 'static {
    fn name(&self) -> &str;

    async fn start(&mut self, api: PluginApi) -> anyhow::Result<()>;

    async fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The plugins loaded into one extension context, in registration order.
pub(crate) struct PluginSet {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginSet {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// Starts every plugin in order. A failing `start` is logged and does not
    /// prevent the others from starting.
    pub async fn start_all(&mut self, api: &PluginApi) {
        for plugin in &mut self.plugins {
            let name = plugin.name().to_string();
            if let Err(e) = plugin.start(api.clone()).await {
                warn!(plugin = %name, error = %e, "plugin start failed");
            }
        }
    }

    /// Stops every plugin in registration order, best-effort: a misbehaving
    /// `stop` never blocks the rest.
    pub async fn stop_all(&mut self) {
        for plugin in &mut self.plugins {
            let name = plugin.name().to_string();
            if let Err(e) = plugin.stop().await {
                warn!(plugin = %name, error = %e, "plugin stop failed");
            }
        }
    }
}
