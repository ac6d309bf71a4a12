//! Duplicate-selector rule for webhook submissions.

use tracing::{debug, instrument};

use crate::{ConfigStore, DocumentBackend, Selector, ValidationError, WebhookError, WebhookId};

/// Checks a candidate selector against the latest committed document.
pub struct WebhookRecordValidator<'a, B> {
    store: &'a ConfigStore<B>,
}

impl<'a, B: DocumentBackend> WebhookRecordValidator<'a, B> {
    pub fn new(store: &'a ConfigStore<B>) -> Self {
        Self { store }
    }

    /// Fails if any record other than `editing` already uses `selector`.
    ///
    /// Reloads the store first so the decision is made against committed
    /// state rather than whatever was cached when the form was rendered.
    /// Reports only the first collision in listing order.
    #[instrument(skip(self, selector), fields(selector = %selector))]
    pub async fn validate_selector(
        &self,
        selector: &Selector,
        editing: Option<WebhookId>,
    ) -> Result<(), WebhookError> {
        self.store.load().await?;
        let document = self.store.get();

        if let Some(existing) = document.find_selector_conflict(selector, editing) {
            debug!(conflicting_id = %existing.id, "Selector already in use");
            return Err(ValidationError::DuplicateSelector {
                selector: selector.clone(),
                webhook_id: existing.id,
                webhook_name: existing.name.clone(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{CapabilityName, ConfigurationDocument, StorageError, WebhookRecord};

    struct SharedBackend(Mutex<ConfigurationDocument>);

    #[async_trait]
    impl DocumentBackend for SharedBackend {
        async fn read(&self) -> Result<Option<ConfigurationDocument>, StorageError> {
            Ok(Some(self.0.lock().unwrap().clone()))
        }

        async fn write(&self, document: &ConfigurationDocument) -> Result<(), StorageError> {
            *self.0.lock().unwrap() = document.clone();
            Ok(())
        }
    }

    fn record(id: u64, name: &str, selector: &str) -> WebhookRecord {
        WebhookRecord {
            id: WebhookId::new(id),
            name: name.to_string(),
            selector: Selector::new(selector).unwrap(),
            processor: CapabilityName::new("JSON").unwrap(),
            handler: CapabilityName::new("Logger").unwrap(),
            description: String::new(),
        }
    }

    fn store(records: Vec<WebhookRecord>) -> ConfigStore<SharedBackend> {
        let document = ConfigurationDocument {
            sequence: records.len() as u64 + 1,
            webhooks: records.into_iter().map(|r| (r.id, r)).collect(),
        };
        ConfigStore::new(SharedBackend(Mutex::new(document)))
    }

    fn selector(s: &str) -> Selector {
        Selector::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_unused_selector_passes() {
        let store = store(vec![record(1, "A", "s1")]);
        let validator = WebhookRecordValidator::new(&store);
        assert!(validator.validate_selector(&selector("s2"), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_names_first_colliding_record() {
        let store = store(vec![record(1, "A", "s1"), record(2, "B", "s2")]);
        let validator = WebhookRecordValidator::new(&store);

        let err = validator
            .validate_selector(&selector("s1"), None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The selector 's1' already set for the 'A' webhook."
        );
    }

    #[tokio::test]
    async fn test_record_does_not_collide_with_itself() {
        let store = store(vec![record(1, "A", "s1")]);
        let validator = WebhookRecordValidator::new(&store);
        assert!(validator
            .validate_selector(&selector("s1"), Some(WebhookId::new(1)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_editing_other_record_still_collides() {
        let store = store(vec![record(1, "A", "s1"), record(2, "B", "s2")]);
        let validator = WebhookRecordValidator::new(&store);
        let err = validator
            .validate_selector(&selector("s1"), Some(WebhookId::new(2)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WebhookError::Validation(ValidationError::DuplicateSelector { webhook_id, .. })
                if webhook_id == WebhookId::new(1)
        ));
    }

    #[tokio::test]
    async fn test_sees_records_committed_after_store_was_loaded() {
        let store = store(vec![]);
        store.load().await.unwrap();
        store
            .backend()
            .0
            .lock()
            .unwrap()
            .webhooks
            .insert(WebhookId::new(1), record(1, "Late", "s1"));
        store.backend().0.lock().unwrap().sequence = 2;

        let validator = WebhookRecordValidator::new(&store);
        let err = validator
            .validate_selector(&selector("s1"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("'Late'"));
    }

    #[tokio::test]
    async fn test_comparison_is_exact() {
        let store = store(vec![record(1, "A", "Orders")]);
        let validator = WebhookRecordValidator::new(&store);
        assert!(validator
            .validate_selector(&selector("orders"), None)
            .await
            .is_ok());
        assert!(validator
            .validate_selector(&selector("Orders "), None)
            .await
            .is_ok());
    }
}
