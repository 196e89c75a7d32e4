//! Whole-document persistence backends for [`super::RequestStore`].
//!
//! The store never writes partial state: every save replaces the full
//! document. `JsonFileBackend` does this by writing a temp file next to the
//! target and renaming it into place, so a crash mid-write leaves the previous
//! document intact.
//!
//! ## Configuration
//!
//! ```text
//! GATEPASS_DB_FILE=/var/lib/gatepass/database.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::models::{PassRequest, UserAccount};

/// The persisted unit: login accounts and every request ever submitted,
/// requests in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<UserAccount>,
    #[serde(default)]
    pub requests: Vec<PassRequest>,
}

/// Abstraction over where the document lives.
/// Implementations: JsonFileBackend (single file on disk), MemoryBackend (tests).
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Read the whole document. A backend with nothing stored yet returns an
    /// empty document.
    async fn load(&self) -> Result<Document>;

    /// Replace the whole document.
    async fn save(&self, doc: &Document) -> Result<()>;
}

/// Keeps nothing; every store opened on it starts empty.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend;

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn load(&self) -> Result<Document> {
        Ok(Document::default())
    }

    async fn save(&self, _doc: &Document) -> Result<()> {
        Ok(())
    }
}

/// Pretty-printed JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "database.json".to_string());
        let tmp_name = format!(".{}.tmp.{}", file_name, uuid::Uuid::new_v4());
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(tmp_name),
            _ => PathBuf::from(tmp_name),
        }
    }
}

#[async_trait]
impl DocumentBackend for JsonFileBackend {
    async fn load(&self) -> Result<Document> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no document on disk, starting empty");
                return Ok(Document::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", self.path.display()))
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }

        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    async fn save(&self, doc: &Document) -> Result<()> {
        let json = serde_json::to_vec_pretty(doc).context("failed to serialize document")?;
        let tmp_path = self.temp_path();

        let write = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(&json).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp_path, &self.path).await
        };

        if let Err(e) = write.await {
            // Try to clean up temp file on error
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e).with_context(|| format!("failed to write {}", self.path.display()));
        }

        tracing::debug!(
            path = %self.path.display(),
            requests = doc.requests.len(),
            "document saved"
        );
        Ok(())
    }
}
