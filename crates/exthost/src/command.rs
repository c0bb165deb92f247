//! # Command registry
//!
//! The host's real command registry: the single source of truth for every
//! user-invokable action, whether it came from host code or was bridged in
//! from an extension. Instance-scoped; a process can run several independent
//! registries.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::disposable::Disposable;

/// A value object identifying a user-invokable action.
///
/// Identity is the string `id`; the label is presentation only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CommandDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), label: None }
    }

    pub fn with_label(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: Some(label.into()) }
    }
}

#[derive(Debug)]
pub enum CommandError {
    /// Registration attempted for an id already in use.
    Duplicate(String),
    /// No handler is registered under the id.
    NotFound(String),
    /// The handler ran and failed.
    Failed(anyhow::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(id) => write!(f, "command '{}' is already registered", id),
            Self::NotFound(id) => write!(f, "Command {} doesn't exist", id),
            Self::Failed(e) => write!(f, "command execution failed: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Failed(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// The executable part of a command.
#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    async fn execute(&self, args: Vec<Value>) -> anyhow::Result<Value>;

    fn is_enabled(&self) -> bool {
        true
    }

    fn is_visible(&self) -> bool {
        true
    }
}

struct FnHandler<F>(F);

#[async_trait::async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn execute(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        (self.0)(args).await
    }
}

/// Wraps an async closure as a [`CommandHandler`].
pub fn command_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

struct RegisteredCommand {
    descriptor: CommandDescriptor,
    handler: Arc<dyn CommandHandler>,
}

/// The host-side command registry.
pub struct CommandRegistry {
    commands: DashMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { commands: DashMap::new() }
    }

    /// Registers a command. A duplicate id is a hard error; unregistering
    /// frees the id for reuse.
    ///
    /// The returned [`Disposable`] removes the registration; disposing twice
    /// is a no-op.
    pub fn register(
        self: &Arc<Self>,
        descriptor: CommandDescriptor,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Disposable> {
        let id = descriptor.id.clone();
        match self.commands.entry(id.clone()) {
            Entry::Occupied(_) => Err(CommandError::Duplicate(id)),
            Entry::Vacant(slot) => {
                slot.insert(RegisteredCommand { descriptor, handler });
                let registry = self.clone();
                Ok(Disposable::new(move || {
                    registry.commands.remove(&id);
                }))
            }
        }
    }

    /// Runs the handler registered under `id`.
    pub async fn execute(&self, id: &str, args: Vec<Value>) -> Result<Value> {
        let handler = self
            .commands
            .get(id)
            .map(|entry| entry.handler.clone())
            .ok_or_else(|| CommandError::NotFound(id.to_string()))?;
        handler.execute(args).await.map_err(CommandError::Failed)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.commands.get(id).map_or(false, |entry| entry.handler.is_enabled())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.commands.get(id).map_or(false, |entry| entry.handler.is_visible())
    }

    /// Descriptors of every registered command, in no particular order.
    pub fn commands(&self) -> Vec<CommandDescriptor> {
        self.commands.iter().map(|entry| entry.descriptor.clone()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
