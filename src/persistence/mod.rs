//! Persistence of stage output artifacts

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// Trait for artifact destinations
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Write `content` to `path`, replacing whatever was there
    ///
    /// Returns the location actually written.
    async fn write(&self, path: &Path, content: &str) -> io::Result<PathBuf>;
}

/// Writes artifacts to disk under a root directory
#[derive(Debug, Clone)]
pub struct FileArtifactSink {
    root: PathBuf,
}

impl FileArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for FileArtifactSink {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl ArtifactSink for FileArtifactSink {
    async fn write(&self, path: &Path, content: &str) -> io::Result<PathBuf> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&target, content).await?;
        debug!("Wrote {} bytes to {}", content.len(), target.display());
        Ok(target)
    }
}

/// In-memory artifacts (for testing or dry runs)
pub struct InMemoryArtifacts {
    files: RwLock<HashMap<PathBuf, String>>,
    writes: RwLock<usize>,
}

impl InMemoryArtifacts {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            writes: RwLock::new(0),
        }
    }

    /// Current content at `path`
    pub async fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().await.get(path.as_ref()).cloned()
    }

    /// Number of writes performed, including overwrites
    pub async fn write_count(&self) -> usize {
        *self.writes.read().await
    }

    /// Paths written so far, sorted
    pub async fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for InMemoryArtifacts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactSink for InMemoryArtifacts {
    async fn write(&self, path: &Path, content: &str) -> io::Result<PathBuf> {
        self.files
            .write()
            .await
            .insert(path.to_path_buf(), content.to_string());
        *self.writes.write().await += 1;
        Ok(path.to_path_buf())
    }
}
