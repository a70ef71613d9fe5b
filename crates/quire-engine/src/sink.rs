//! Where serialized documents go.
//!
//! The engine never decides how a document is stored. Saving hands the
//! adapter's output to a [`DocumentSink`] supplied by the host.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Destination for serialized documents.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn write(&self, document: &str) -> anyhow::Result<()>;
}

/// Keeps every written document in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every document written so far, oldest first.
    pub async fn documents(&self) -> Vec<String> {
        self.documents.lock().await.clone()
    }

    pub async fn last(&self) -> Option<String> {
        self.documents.lock().await.last().cloned()
    }

    pub async fn write_count(&self) -> usize {
        self.documents.lock().await.len()
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn write(&self, document: &str) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("memory sink is failing");
        }
        self.documents.lock().await.push(document.to_string());
        Ok(())
    }
}

/// Writes the document to a file, replacing it.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSink for FileSink {
    async fn write(&self, document: &str) -> anyhow::Result<()> {
        // Write beside the target then rename, so readers never see half a file.
        let tmp = self.path.with_extension("quire-tmp");
        tokio::fs::write(&tmp, document).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
            }
            return Err(err.into());
        }
        tracing::debug!(path = %self.path.display(), bytes = document.len(), "document written");
        Ok(())
    }
}
