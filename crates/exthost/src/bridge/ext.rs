//! The extension half of the bridge.
//!
//! Owns the actual command handlers. Registration is checked locally first,
//! so a duplicate id fails synchronously before anything is sent; only then
//! is the registration mirrored to the host.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
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
use crate::command::CommandError;
use crate::command::CommandHandler;
use crate::disposable::Disposable;
use crate::ident::COMMAND_REGISTRY_HOST;

/// Typed stub for the host half.
#[derive(Clone)]
pub struct HostCommandsProxy {
    proxy: RpcProxy,
}

impl HostCommandsProxy {
    pub fn new(protocol: &RpcProtocol) -> Self {
        Self { proxy: protocol.get_proxy(COMMAND_REGISTRY_HOST) }
    }

    pub async fn register_command(&self, descriptor: &CommandDescriptor) -> extrpc::Result<()> {
        let value = serde_json::to_value(descriptor)
            .map_err(|e| RpcError::Frame(extframe::Error::Encode(e)))?;
        self.proxy.invoke(methods::REGISTER_COMMAND, vec![value]).await?;
        Ok(())
    }

    pub async fn unregister_command(&self, id: &str) -> extrpc::Result<()> {
        self.proxy.invoke(methods::UNREGISTER_COMMAND, vec![json!(id)]).await?;
        Ok(())
    }
}

/// The extension half of the command registry bridge.
///
/// Per command id: Unregistered → Registered on `register_command`,
/// Registered → Unregistered on dispose; `execute_command` is only valid
/// while Registered.
pub struct CommandRegistryExt {
    handlers: DashMap<String, Arc<dyn CommandHandler>>,
    host: HostCommandsProxy,
}

impl CommandRegistryExt {
    pub fn new(host: HostCommandsProxy) -> Arc<Self> {
        Arc::new(Self { handlers: DashMap::new(), host })
    }

    /// Stores `handler` under the descriptor's id and mirrors the
    /// registration to the host.
    ///
    /// Fails with [`CommandError::Duplicate`] before any message is sent if
    /// the id is already registered on this side. The returned disposable
    /// unregisters both sides and is idempotent.
    pub fn register_command(
        self: &Arc<Self>,
        descriptor: CommandDescriptor,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Disposable, CommandError> {
        let id = descriptor.id.clone();
        match self.handlers.entry(id.clone()) {
            Entry::Occupied(_) => return Err(CommandError::Duplicate(id)),
            Entry::Vacant(slot) => {
                slot.insert(handler);
            }
        }

        {
            let host = self.host.clone();
            let descriptor = descriptor.clone();
            tokio::spawn(async move {
                if let Err(e) = host.register_command(&descriptor).await {
                    warn!(command = %descriptor.id, error = %e, "host-side registration failed");
                }
            });
        }

        let registry = self.clone();
        Ok(Disposable::new(move || registry.unregister(&id)))
    }

    fn unregister(&self, id: &str) {
        if self.handlers.remove(id).is_none() {
            return;
        }

        let host = self.host.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = host.unregister_command(&id).await {
                warn!(command = %id, error = %e, "host-side unregistration failed");
            }
        });
    }

    /// Runs the local handler for `id`.
    pub async fn execute_command(&self, id: &str, args: Vec<Value>) -> Result<Value, CommandError> {
        let handler = self
            .handlers
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CommandError::NotFound(id.to_string()))?;
        handler.execute(args).await.map_err(CommandError::Failed)
    }

    /// The ids registered on this side.
    pub fn commands(&self) -> Vec<String> {
        self.handlers.iter().map(|entry| entry.key().clone()).collect()
    }
}

fn to_remote(error: CommandError) -> RemoteError {
    match &error {
        CommandError::NotFound(_) => {
            RemoteError::with_name(names::COMMAND_NOT_FOUND, error.to_string())
        }
        _ => RemoteError::new(error.to_string()),
    }
}

#[async_trait::async_trait]
impl RpcHandler for CommandRegistryExt {
    async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Value, RemoteError> {
        match method {
            methods::EXECUTE_COMMAND => {
                let mut args = args.into_iter();
                let id = match args.next() {
                    Some(Value::String(id)) => id,
                    _ => return Err(RemoteError::new("missing command id")),
                };
                let rest: Vec<Value> = args.collect();
                self.execute_command(&id, rest).await.map_err(to_remote)
            }
            methods::GET_COMMANDS => Ok(json!(self.commands())),
            other => Err(RemoteError::with_name(
                names::METHOD_NOT_FOUND,
                format!("no method '{}'", other),
            )),
        }
    }
}
