//! The API surface handed to plugin code.

use std::sync::Arc;

use serde_json::Value;

use crate::bridge::ext::CommandRegistryExt;
use crate::command::CommandDescriptor;
use crate::command::CommandError;
use crate::command::CommandHandler;
use crate::disposable::Disposable;

/// Everything a plugin may touch. Cheap to clone.
#[derive(Clone)]
pub struct PluginApi {
    commands: Commands,
}

impl PluginApi {
    pub(crate) fn new(ext: Arc<CommandRegistryExt>) -> Self {
        Self { commands: Commands { ext } }
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }
}

/// The `commands` namespace.
#[derive(Clone)]
pub struct Commands {
    ext: Arc<CommandRegistryExt>,
}

impl Commands {
    /// Registers a command whose handler runs in this extension context.
    ///
    /// Fails if the id is already registered here. The returned disposable
    /// unregisters the command on both sides.
    pub fn register_command(
        &self,
        descriptor: CommandDescriptor,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Disposable, CommandError> {
        self.ext.register_command(descriptor, handler)
    }

    /// Runs a command registered in this extension context.
    pub async fn execute_command(&self, id: &str, args: Vec<Value>) -> Result<Value, CommandError> {
        self.ext.execute_command(id, args).await
    }

    /// The ids registered in this extension context.
    pub fn get_commands(&self) -> Vec<String> {
        self.ext.commands()
    }
}
