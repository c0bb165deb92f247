//! Plugin package descriptors.
//!
//! A manifest declares where the extension's code lives, per hosting
//! modality: a `worker` entry, a `node` entry, or both. Entries resolve to
//! absolute paths against the manifest's own directory.

use std::fmt;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug)]
pub enum ManifestError {
    Io(io::Error),
    Parse(serde_json::Error),
    /// The manifest declares no entry point for the requested modality.
    MissingEntry { name: String, kind: &'static str },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Manifest I/O error: {}", e),
            Self::Parse(e) => write!(f, "Manifest parse error: {}", e),
            Self::MissingEntry { name, kind } => {
                write!(f, "plugin '{}' declares no '{}' entry point", name, kind)
            }
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::MissingEntry { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ManifestError>;

/// A plugin's package descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    /// Entry point for the in-process worker modality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<PathBuf>,
    /// Entry point for the child-process modality: an executable built on
    /// [`run_process_extension`](crate::run_process_extension).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<PathBuf>,
}

impl PluginManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(ManifestError::Io)?;
        serde_json::from_str(&text).map_err(ManifestError::Parse)
    }

    pub fn resolve_worker(&self, base: &Path) -> Result<PathBuf> {
        let entry = self.worker.as_ref().ok_or_else(|| ManifestError::MissingEntry {
            name: self.name.clone(),
            kind: "worker",
        })?;
        Ok(absolutize(base, entry))
    }

    pub fn resolve_node(&self, base: &Path) -> Result<PathBuf> {
        let entry = self.node.as_ref().ok_or_else(|| ManifestError::MissingEntry {
            name: self.name.clone(),
            kind: "node",
        })?;
        Ok(absolutize(base, entry))
    }
}

fn absolutize(base: &Path, entry: &Path) -> PathBuf {
    if entry.is_absolute() {
        entry.to_path_buf()
    } else {
        base.join(entry)
    }
}
