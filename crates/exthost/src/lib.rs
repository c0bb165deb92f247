//! # ExtHost
//!
//! Extension hosting over the [extrpc] protocol core.
//!
//! ## Architecture
//!
//! The host process owns the real [`CommandRegistry`]; extension code runs in
//! an isolated context (a dedicated worker thread or a child process) and
//! talks to the host exclusively through RPC round trips. The command
//! registry bridge has two cooperating halves:
//!
//! - the **host half** mirrors extension-registered commands into the real
//!   registry and notifies the extension side when one executes;
//! - the **extension half** keeps the actual handlers and exposes the
//!   `commands` namespace of [`PluginApi`] to plugin code.
//!
//! Every hosting modality funnels through the same wiring routine in
//! [`bootstrap`]; [`WorkerHost`] and [`ProcessHost`] only differ in how they
//! construct the transport and where the extension loop runs.

pub mod api;
pub mod bootstrap;
pub mod bridge;
pub mod command;
pub mod config;
pub mod disposable;
pub mod ident;
pub mod manifest;
pub mod plugin;
pub mod process;
pub mod worker;

#[cfg(test)]
mod tests;

pub use crate::api::Commands;
pub use crate::api::PluginApi;
pub use crate::bridge::ext::CommandRegistryExt;
pub use crate::bridge::ext::HostCommandsProxy;
pub use crate::bridge::host::CommandRegistryHost;
pub use crate::bridge::host::ExtCommandsProxy;
pub use crate::command::CommandDescriptor;
pub use crate::command::CommandError;
pub use crate::command::CommandHandler;
pub use crate::command::CommandRegistry;
pub use crate::command::command_fn;
pub use crate::config::ExecutionMode;
pub use crate::config::HostConfig;
pub use crate::disposable::Disposable;
pub use crate::ident::COMMAND_REGISTRY_EXT;
pub use crate::ident::COMMAND_REGISTRY_HOST;
pub use crate::manifest::ManifestError;
pub use crate::manifest::PluginManifest;
pub use crate::plugin::Plugin;
pub use crate::process::ProcessHost;
pub use crate::process::run_process_extension;
pub use crate::worker::WorkerHost;
