//! The host half of the bridge.
//!
//! Mirrors extension-registered commands into the host's real
//! [`CommandRegistry`]. The mirrored handler notifies the extension side when
//! the command executes; whether that notification is awaited is the
//! [`ExecutionMode`] decision.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use serde_json::json;
use tracing::warn;

use extframe::RemoteError;
use extframe::names;
use extrpc::RpcError;
use extrpc::RpcHandler;
use extrpc::RpcProtocol;
use extrpc::RpcProxy;

use crate::bridge::methods;
use crate::command::CommandDescriptor;
use crate::command::CommandHandler;
use crate::command::CommandRegistry;
use crate::config::ExecutionMode;
use crate::disposable::Disposable;
use crate::ident::COMMAND_REGISTRY_EXT;

/// Typed stub for the extension half. Forwards each declared method through
/// the proxy's single `invoke` primitive.
#[derive(Clone)]
pub struct ExtCommandsProxy {
    proxy: RpcProxy,
}

impl ExtCommandsProxy {
    pub fn new(protocol: &RpcProtocol) -> Self {
        Self { proxy: protocol.get_proxy(COMMAND_REGISTRY_EXT) }
    }

    /// Asks the extension side to run one of its commands.
    pub async fn execute_command(&self, id: &str, args: Vec<Value>) -> extrpc::Result<Value> {
        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(json!(id));
        call_args.extend(args);
        self.proxy.invoke(methods::EXECUTE_COMMAND, call_args).await
    }

    /// The command ids currently registered on the extension side.
    pub async fn get_commands(&self) -> extrpc::Result<Vec<String>> {
        let value = self.proxy.invoke(methods::GET_COMMANDS, vec![]).await?;
        serde_json::from_value(value).map_err(|e| RpcError::Frame(extframe::Error::Decode(e)))
    }
}

/// A host-registry handler standing in for a command whose real handler lives
/// on the extension side.
struct BridgedCommand {
    id: String,
    ext: ExtCommandsProxy,
    mode: ExecutionMode,
}

#[async_trait::async_trait]
impl CommandHandler for BridgedCommand {
    async fn execute(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        match self.mode {
            ExecutionMode::FireAndForget => {
                let ext = self.ext.clone();
                let id = self.id.clone();
                tokio::spawn(async move {
                    if let Err(e) = ext.execute_command(&id, args).await {
                        warn!(command = %id, error = %e, "bridged command execution failed");
                    }
                });
                Ok(Value::Null)
            }
            ExecutionMode::Awaited => self
                .ext
                .execute_command(&self.id, args)
                .await
                .map_err(anyhow::Error::new),
        }
    }

    // Enablement is not delegated across the boundary.
    fn is_enabled(&self) -> bool {
        true
    }

    fn is_visible(&self) -> bool {
        true
    }
}

/// The host half of the command registry bridge.
pub struct CommandRegistryHost {
    registry: Arc<CommandRegistry>,
    ext: ExtCommandsProxy,
    mode: ExecutionMode,
    registrations: DashMap<String, Disposable>,
}

impl CommandRegistryHost {
    pub fn new(registry: Arc<CommandRegistry>, ext: ExtCommandsProxy, mode: ExecutionMode) -> Self {
        Self { registry, ext, mode, registrations: DashMap::new() }
    }

    fn register_command(&self, descriptor: CommandDescriptor) -> Result<(), RemoteError> {
        let id = descriptor.id.clone();
        let handler = Arc::new(BridgedCommand {
            id: id.clone(),
            ext: self.ext.clone(),
            mode: self.mode,
        });

        let disposable = self
            .registry
            .register(descriptor, handler)
            .map_err(|e| RemoteError::new(e.to_string()))?;
        self.registrations.insert(id, disposable);
        Ok(())
    }

    /// No-op when the id was never bridged.
    fn unregister_command(&self, id: &str) {
        if let Some((_, mut disposable)) = self.registrations.remove(id) {
            disposable.dispose();
        }
    }
}

impl Drop for CommandRegistryHost {
    fn drop(&mut self) {
        // The extension context is going away; its commands go with it.
        for mut entry in self.registrations.iter_mut() {
            entry.value_mut().dispose();
        }
    }
}

#[async_trait::async_trait]
impl RpcHandler for CommandRegistryHost {
    async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value, RemoteError> {
        match method {
            methods::REGISTER_COMMAND => {
                let descriptor = args
                    .into_iter()
                    .next()
                    .ok_or_else(|| RemoteError::new("missing command descriptor"))?;
                let descriptor: CommandDescriptor = serde_json::from_value(descriptor)
                    .map_err(|e| RemoteError::new(format!("bad command descriptor: {}", e)))?;
                self.register_command(descriptor)?;
                Ok(Value::Null)
            }
            methods::UNREGISTER_COMMAND => {
                let id = args
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| RemoteError::new("missing command id"))?;
                self.unregister_command(id);
                Ok(Value::Null)
            }
            // The host never initiates execution through this path; only the
            // extension side triggers execution, indirectly, via the handler
            // installed by `register-command`.
            methods::EXECUTE_COMMAND | methods::GET_COMMANDS => Err(RemoteError::with_name(
                names::METHOD_NOT_SUPPORTED,
                format!("'{}' is not supported on the host half", method),
            )),
            other => Err(RemoteError::with_name(
                names::METHOD_NOT_FOUND,
                format!("no method '{}'", other),
            )),
        }
    }
}
