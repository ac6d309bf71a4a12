//! In-process [`DocumentBackend`] with no durability.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use webhook::{ConfigurationDocument, DocumentBackend, StorageError};

/// Keeps the document in memory.
///
/// Used by tests and by dry runs that must not touch the configured file.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: Mutex<Option<ConfigurationDocument>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that already holds `document`.
    pub fn with_document(document: ConfigurationDocument) -> Self {
        Self {
            document: Mutex::new(Some(document)),
        }
    }

    /// The last document written, if any.
    pub fn snapshot(&self) -> Option<ConfigurationDocument> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn read(&self) -> Result<Option<ConfigurationDocument>, StorageError> {
        Ok(self.snapshot())
    }

    async fn write(&self, document: &ConfigurationDocument) -> Result<(), StorageError> {
        *self
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_replaces_snapshot() {
        let backend = MemoryBackend::with_document(ConfigurationDocument::default());
        let next = ConfigurationDocument {
            sequence: 5,
            ..ConfigurationDocument::default()
        };
        backend.write(&next).await.unwrap();
        assert_eq!(backend.snapshot(), Some(next));
    }
}
