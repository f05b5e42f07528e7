//! Cassette storage backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

use super::key::Fingerprint;
use crate::{Error, ErrorContext, Result};

/// One recorded request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedInteraction {
    pub fingerprint: Fingerprint,
    pub model: String,
    /// Wire request, kept for inspecting cassettes by hand.
    pub request: serde_json::Value,
    pub response: serde_json::Value,
}

#[async_trait]
pub trait Cassette: Send + Sync {
    async fn load(&self, fingerprint: &Fingerprint) -> Result<Option<RecordedInteraction>>;
    async fn store(&self, interaction: &RecordedInteraction) -> Result<()>;
    async fn len(&self) -> Result<usize>;
    fn name(&self) -> &'static str;
}

fn lock_poisoned() -> Error {
    Error::recording_with_context(
        "cassette lock poisoned",
        ErrorContext::new().with_source("memory_cassette"),
    )
}

/// In-process cassette.
#[derive(Debug, Default)]
pub struct MemoryCassette {
    entries: RwLock<HashMap<Fingerprint, RecordedInteraction>>,
}

impl MemoryCassette {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cassette for MemoryCassette {
    async fn load(&self, fingerprint: &Fingerprint) -> Result<Option<RecordedInteraction>> {
        let entries = self.entries.read().map_err(|_| lock_poisoned())?;
        Ok(entries.get(fingerprint).cloned())
    }

    async fn store(&self, interaction: &RecordedInteraction) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| lock_poisoned())?;
        entries.insert(interaction.fingerprint.clone(), interaction.clone());
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(|_| lock_poisoned())?.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Directory of `<fingerprint>.json` files, one interaction per file.
#[derive(Debug, Clone)]
pub struct FileCassette {
    dir: PathBuf,
}

impl FileCassette {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.json", fingerprint))
    }

    fn io_error(&self, action: &str, path: &Path, err: std::io::Error) -> Error {
        Error::recording_with_context(
            format!("failed to {} cassette: {}", action, err),
            ErrorContext::new()
                .with_field_path(path.display().to_string())
                .with_source("file_cassette"),
        )
    }
}

#[async_trait]
impl Cassette for FileCassette {
    async fn load(&self, fingerprint: &Fingerprint) -> Result<Option<RecordedInteraction>> {
        let path = self.path_for(fingerprint);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error("read", &path, e)),
        };
        let interaction: RecordedInteraction = serde_json::from_slice(&bytes).map_err(|e| {
            Error::recording_with_context(
                format!("malformed cassette: {}", e),
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_source("file_cassette"),
            )
        })?;
        Ok(Some(interaction))
    }

    async fn store(&self, interaction: &RecordedInteraction) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.io_error("create directory for", &self.dir, e))?;
        let path = self.path_for(&interaction.fingerprint);
        let data = serde_json::to_vec_pretty(interaction)?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| self.io_error("write", &path, e))?;
        debug!(path = %path.display(), "stored cassette");
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.io_error("list", &self.dir, e)),
        };
        let mut count = 0;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| self.io_error("list", &self.dir, e))?
        {
            if entry.path().extension().and_then(|x| x.to_str()) == Some("json") {
                count += 1;
            }
        }
        Ok(count)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
