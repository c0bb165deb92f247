//! Unit tests for the host registry, disposables, and manifests.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde_json::json;

use crate::command::CommandDescriptor;
use crate::command::CommandError;
use crate::command::CommandRegistry;
use crate::command::command_fn;
use crate::config::ExecutionMode;
use crate::config::HostConfig;
use crate::disposable::Disposable;
use crate::manifest::ManifestError;
use crate::manifest::PluginManifest;

fn nop_handler() -> Arc<dyn crate::command::CommandHandler> {
    command_fn(|_args| async { Ok(serde_json::Value::Null) })
}

#[tokio::test]
async fn test_registry_register_and_execute() {
    let registry = Arc::new(CommandRegistry::new());
    let handler = command_fn(|args| async move { Ok(json!({ "echoed": args })) });

    registry.register(CommandDescriptor::new("demo.echo"), handler).unwrap();

    let result = registry.execute("demo.echo", vec![json!(1)]).await.unwrap();
    assert_eq!(result, json!({ "echoed": [1] }));
}

#[tokio::test]
async fn test_registry_duplicate_id_is_hard_error() {
    let registry = Arc::new(CommandRegistry::new());
    registry.register(CommandDescriptor::new("demo.once"), nop_handler()).unwrap();

    let err = registry
        .register(CommandDescriptor::new("demo.once"), nop_handler())
        .unwrap_err();
    assert!(matches!(err, CommandError::Duplicate(ref id) if id == "demo.once"));
}

#[tokio::test]
async fn test_registry_unknown_command_rejects() {
    let registry = Arc::new(CommandRegistry::new());

    let err = registry.execute("demo.ghost", vec![]).await.unwrap_err();
    assert!(matches!(err, CommandError::NotFound(_)));
    assert_eq!(err.to_string(), "Command demo.ghost doesn't exist");
}

#[tokio::test]
async fn test_registry_dispose_frees_id_and_is_idempotent() {
    let registry = Arc::new(CommandRegistry::new());

    let mut registration = registry
        .register(CommandDescriptor::new("demo.tmp"), nop_handler())
        .unwrap();
    assert!(registry.contains("demo.tmp"));

    registration.dispose();
    assert!(!registry.contains("demo.tmp"));

    // Second dispose has no observable effect.
    registration.dispose();
    assert!(registration.is_disposed());

    // The id is free for reuse.
    registry.register(CommandDescriptor::new("demo.tmp"), nop_handler()).unwrap();
}

#[tokio::test]
async fn test_registry_handler_failure_surfaces() {
    let registry = Arc::new(CommandRegistry::new());
    let handler = command_fn(|_args| async { anyhow::bail!("handler exploded") });
    registry.register(CommandDescriptor::new("demo.bad"), handler).unwrap();

    let err = registry.execute("demo.bad", vec![]).await.unwrap_err();
    assert!(matches!(err, CommandError::Failed(_)));
    assert!(err.to_string().contains("handler exploded"));
}

#[test]
fn test_registry_enablement_defaults() {
    let registry = Arc::new(CommandRegistry::new());
    registry.register(CommandDescriptor::new("demo.on"), nop_handler()).unwrap();

    assert!(registry.is_enabled("demo.on"));
    assert!(registry.is_visible("demo.on"));
    assert!(!registry.is_enabled("demo.missing"));
    assert!(!registry.is_visible("demo.missing"));
}

#[test]
fn test_registry_lists_descriptors() {
    let registry = Arc::new(CommandRegistry::new());
    registry
        .register(CommandDescriptor::with_label("demo.a", "A"), nop_handler())
        .unwrap();
    registry.register(CommandDescriptor::new("demo.b"), nop_handler()).unwrap();

    let mut ids: Vec<String> = registry.commands().into_iter().map(|d| d.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["demo.a", "demo.b"]);
}

#[test]
fn test_disposable_runs_action_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut disposable = Disposable::new({
        let count = count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    });

    assert!(!disposable.is_disposed());
    disposable.dispose();
    disposable.dispose();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(disposable.is_disposed());

    let mut noop = Disposable::noop();
    assert!(noop.is_disposed());
    noop.dispose();
}

#[test]
fn test_descriptor_wire_shape() {
    let bare = CommandDescriptor::new("demo.bare");
    let value = serde_json::to_value(&bare).unwrap();
    assert_eq!(value, json!({ "id": "demo.bare" }));

    let labeled = CommandDescriptor::with_label("demo.labeled", "Do the thing");
    let value = serde_json::to_value(&labeled).unwrap();
    assert_eq!(value, json!({ "id": "demo.labeled", "label": "Do the thing" }));
}

#[test]
fn test_manifest_entries_and_resolution() {
    let manifest: PluginManifest = serde_json::from_str(
        r#"{ "name": "demo", "worker": "dist/worker-entry", "node": "bin/ext-host" }"#,
    )
    .unwrap();

    let base = Path::new("/opt/plugins/demo");
    assert_eq!(manifest.resolve_worker(base).unwrap(), PathBuf::from("/opt/plugins/demo/dist/worker-entry"));
    assert_eq!(manifest.resolve_node(base).unwrap(), PathBuf::from("/opt/plugins/demo/bin/ext-host"));

    // Absolute entries are kept as-is.
    let absolute: PluginManifest =
        serde_json::from_str(r#"{ "name": "abs", "node": "/usr/lib/ext-host" }"#).unwrap();
    assert_eq!(absolute.resolve_node(base).unwrap(), PathBuf::from("/usr/lib/ext-host"));
}

#[test]
fn test_manifest_missing_entry() {
    let manifest: PluginManifest =
        serde_json::from_str(r#"{ "name": "worker-only", "worker": "dist/entry" }"#).unwrap();

    let err = manifest.resolve_node(Path::new("/tmp")).unwrap_err();
    assert!(matches!(err, ManifestError::MissingEntry { kind: "node", .. }));
    assert!(err.to_string().contains("worker-only"));
}

#[test]
fn test_manifest_load_from_disk() {
    let path = std::env::temp_dir().join(format!("exthost-manifest-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "name": "disk", "node": "bin/ext" }"#).unwrap();

    let manifest = PluginManifest::load(&path).unwrap();
    assert_eq!(manifest.name, "disk");
    assert_eq!(manifest.node, Some(PathBuf::from("bin/ext")));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_host_config_defaults() {
    let config = HostConfig::default();
    assert_eq!(config.execution_mode, ExecutionMode::FireAndForget);
    assert!(config.call_timeout.is_none());
}

#[tokio::test]
async fn test_registry_shared_across_tasks() {
    let registry = Arc::new(CommandRegistry::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    let handler = command_fn({
        let log = log.clone();
        move |args| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(args);
                Ok(serde_json::Value::Null)
            }
        }
    });
    registry.register(CommandDescriptor::new("demo.log"), handler).unwrap();

    let mut tasks = Vec::new();
    for i in 0..4 {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            registry.execute("demo.log", vec![json!(i)]).await.unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(log.lock().unwrap().len(), 4);
}
