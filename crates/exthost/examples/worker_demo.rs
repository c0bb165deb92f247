//! A plugin registers a command from an isolated worker thread; the host
//! invokes it through its own command registry.
//!
//! Run with `RUST_LOG=debug` to watch the frames flow.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;

use exthost::CommandDescriptor;
use exthost::CommandRegistry;
use exthost::Disposable;
use exthost::HostConfig;
use exthost::Plugin;
use exthost::PluginApi;
use exthost::WorkerHost;
use exthost::command_fn;

struct HelloPlugin {
    registration: Option<Disposable>,
}

#[async_trait::async_trait]
impl Plugin for HelloPlugin {
    fn name(&self) -> &str {
        "hello"
    }

    async fn start(&mut self, api: PluginApi) -> anyhow::Result<()> {
        let registration = api.commands().register_command(
            CommandDescriptor::with_label("demo.hello", "Say hello"),
            command_fn(|args| async move {
                println!("[plugin] demo.hello invoked with {}", json!(args));
                Ok(Value::Null)
            }),
        )?;
        self.registration = Some(registration);
        Ok(())
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        println!("[plugin] stopping");
        if let Some(mut registration) = self.registration.take() {
            registration.dispose();
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = Arc::new(CommandRegistry::new());
    let host = WorkerHost::spawn(
        registry.clone(),
        HostConfig::default(),
        vec![Box::new(HelloPlugin { registration: None })],
    )?;

    // Registration crosses the boundary asynchronously.
    while !registry.contains("demo.hello") {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    println!("[host] commands: {:?}", registry.commands());
    registry.execute("demo.hello", vec![json!("from the host")]).await?;

    tokio::time::sleep(Duration::from_millis(50)).await;
    host.shutdown().await?;
    Ok(())
}
