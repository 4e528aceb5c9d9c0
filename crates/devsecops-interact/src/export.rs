//! Artifact export (workflow files, threat reports)

use crate::error::{InteractError, InteractResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};

/// Destination for exported artifacts
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Store `contents` under the relative `name`, returning where it went
    async fn write_artifact(&self, name: &str, contents: &str) -> InteractResult<PathBuf>;
}

/// Export an artifact, logging instead of failing.
///
/// Returns the written location, or `None` when the sink failed.
pub async fn export_artifact(sink: &dyn ExportSink, name: &str, contents: &str) -> Option<PathBuf> {
    match sink.write_artifact(name, contents).await {
        Ok(path) => {
            info!("Exported {} to {}", name, path.display());
            Some(path)
        }
        Err(e) => {
            error!("Failed to export {}: {}", name, e);
            None
        }
    }
}

/// Artifact names must stay below the sink root
fn validate_name(name: &str) -> InteractResult<&Path> {
    let path = Path::new(name);
    let relative = !name.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if relative {
        Ok(path)
    } else {
        Err(InteractError::InvalidArtifactName(path.to_path_buf()))
    }
}

/// Writes artifacts below a root directory, creating parents as needed
#[derive(Debug, Clone)]
pub struct FileExportSink {
    root: PathBuf,
}

impl FileExportSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ExportSink for FileExportSink {
    async fn write_artifact(&self, name: &str, contents: &str) -> InteractResult<PathBuf> {
        let path = self.root.join(validate_name(name)?);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Default)]
pub struct MemoryExportSink {
    artifacts: Mutex<BTreeMap<String, String>>,
}

impl MemoryExportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifact(&self, name: &str) -> Option<String> {
        self.artifacts.lock().ok().and_then(|artifacts| artifacts.get(name).cloned())
    }
}

#[async_trait]
impl ExportSink for MemoryExportSink {
    async fn write_artifact(&self, name: &str, contents: &str) -> InteractResult<PathBuf> {
        let path = validate_name(name)?.to_path_buf();
        let mut artifacts = self
            .artifacts
            .lock()
            .map_err(|_| InteractError::Io(std::io::Error::other("artifact store poisoned")))?;
        artifacts.insert(name.to_string(), contents.to_string());
        Ok(path)
    }
}
