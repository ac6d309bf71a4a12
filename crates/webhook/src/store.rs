//! The configuration store: whole-document CRUD over a [`DocumentBackend`].
//!
//! Every mutation is a load-modify-persist cycle. The backend is asked to
//! write the complete new document in one step, and the in-memory copy is
//! only replaced once that write has succeeded, so a failed write leaves both
//! the persisted and the cached document as they were.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::{
    ConfigurationDocument, StorageError, ValidationError, WebhookDraft, WebhookError, WebhookId,
    WebhookRecord,
};

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Durable storage for a [`ConfigurationDocument`].
///
/// Implementations read and write the document as a unit. `write` must be
/// atomic: after it returns, readers see either the old or the new document,
/// never a mixture.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Reads the persisted document, or `None` if nothing has been stored yet.
    async fn read(&self) -> Result<Option<ConfigurationDocument>, StorageError>;

    /// Replaces the persisted document.
    async fn write(&self, document: &ConfigurationDocument) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// CRUD access to the webhook configuration document.
pub struct ConfigStore<B> {
    backend: B,
    current: RwLock<ConfigurationDocument>,
}

impl<B: DocumentBackend> ConfigStore<B> {
    /// Creates a store over `backend`. Nothing is read until [`Self::load`].
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: RwLock::new(ConfigurationDocument::default()),
        }
    }

    /// Returns the backend this store persists through.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reads the persisted document into memory.
    ///
    /// A backend with nothing stored yields the empty document. A document
    /// that breaks an invariant is reported as [`StorageError::Malformed`] and
    /// the in-memory copy is left untouched.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), WebhookError> {
        let document = self.fetch().await?;
        debug!(
            sequence = document.sequence,
            webhooks = document.webhooks.len(),
            "Loaded webhook configuration"
        );
        self.replace_current(document);
        Ok(())
    }

    /// Returns the most recently loaded or written document.
    ///
    /// Never touches the backend.
    pub fn get(&self) -> ConfigurationDocument {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the record with `id` from the in-memory document.
    pub fn webhook(&self, id: WebhookId) -> Option<WebhookRecord> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .webhook(id)
            .cloned()
    }

    /// Returns every record of the in-memory document in listing order.
    pub fn webhooks(&self) -> Vec<WebhookRecord> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .webhooks
            .values()
            .cloned()
            .collect()
    }

    /// Replaces the whole stored document with `document`.
    #[instrument(skip(self, document), fields(sequence = document.sequence))]
    pub async fn update(&self, document: ConfigurationDocument) -> Result<(), WebhookError> {
        document
            .check_invariants()
            .map_err(|message| ValidationError::InvalidDocument { message })?;
        self.persist(document).await
    }

    /// Stores `draft` as a new webhook and returns it with its allocated id.
    ///
    /// The id is the document's current `sequence`, which is then incremented.
    /// A sequence that cannot be incremented is rejected before anything is
    /// written. The selector is re-checked against the freshly loaded document even if
    /// the caller has validated it already.
    #[instrument(skip(self, draft), fields(selector = %draft.selector))]
    pub async fn add_webhook(&self, draft: WebhookDraft) -> Result<WebhookRecord, WebhookError> {
        let mut document = self.fetch().await?;
        reject_conflict(&document, &draft.selector, None)?;

        let Some(next_sequence) = document.sequence.checked_add(1) else {
            warn!(sequence = document.sequence, "Webhook id sequence exhausted");
            return Err(ValidationError::InvalidDocument {
                message: "webhook id sequence is exhausted".to_string(),
            }
            .into());
        };
        let id = WebhookId::new(document.sequence);
        let record = WebhookRecord::from_draft(id, draft);
        document.webhooks.insert(id, record.clone());
        document.sequence = next_sequence;

        self.persist(document).await?;
        info!(webhook_id = %id, name = %record.name, "Webhook added");
        Ok(record)
    }

    /// Replaces the stored webhook that has `record.id`.
    ///
    /// The record keeps its position in the listing order.
    #[instrument(skip(self, record), fields(webhook_id = %record.id))]
    pub async fn update_webhook(&self, record: WebhookRecord) -> Result<(), WebhookError> {
        let mut document = self.fetch().await?;
        if !document.webhooks.contains_key(&record.id) {
            warn!("Update targeted a webhook that does not exist");
            return Err(WebhookError::NotFound { id: record.id });
        }
        reject_conflict(&document, &record.selector, Some(record.id))?;

        let id = record.id;
        document.webhooks.insert(id, record);
        self.persist(document).await?;
        info!(webhook_id = %id, "Webhook updated");
        Ok(())
    }

    async fn fetch(&self) -> Result<ConfigurationDocument, WebhookError> {
        let document = self.backend.read().await?.unwrap_or_default();
        document
            .check_invariants()
            .map_err(|message| StorageError::Malformed { message })?;
        Ok(document)
    }

    async fn persist(&self, document: ConfigurationDocument) -> Result<(), WebhookError> {
        self.backend.write(&document).await?;
        self.replace_current(document);
        Ok(())
    }

    fn replace_current(&self, document: ConfigurationDocument) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = document;
    }
}

fn reject_conflict(
    document: &ConfigurationDocument,
    selector: &crate::Selector,
    exclude: Option<WebhookId>,
) -> Result<(), ValidationError> {
    match document.find_selector_conflict(selector, exclude) {
        Some(existing) => Err(ValidationError::DuplicateSelector {
            selector: selector.clone(),
            webhook_id: existing.id,
            webhook_name: existing.name.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
