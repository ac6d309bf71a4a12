//! File-backed [`DocumentBackend`] storing the document as pretty JSON.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use webhook::{ConfigurationDocument, DocumentBackend, StorageError};

/// Persists the configuration document to a single JSON file.
///
/// Writes go to a uniquely named sibling temp file which is synced and then
/// renamed over the target, so a crash mid-write never leaves a truncated
/// document behind.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this backend reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl DocumentBackend for JsonFileBackend {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read(&self) -> Result<Option<ConfigurationDocument>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration file yet");
                return Ok(None);
            }
            Err(error) => return Err(self.io_error(&self.path, error)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|error| StorageError::Malformed {
                message: format!("{}: {error}", self.path.display()),
            })
    }

    #[instrument(skip(self, document), fields(path = %self.path.display()))]
    async fn write(&self, document: &ConfigurationDocument) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| self.io_error(parent, error))?;
        }

        let payload = serde_json::to_vec_pretty(document)?;
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        let written = async {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(&payload).await?;
            file.sync_all().await?;
            tokio::fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(error) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(temp = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
                }
            }
            return Err(self.io_error(&self.path, error));
        }

        debug!(bytes = payload.len(), "Configuration written");
        Ok(())
    }
}
