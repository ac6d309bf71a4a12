//! The create/edit workflow for a single webhook.

use tracing::{error, info, instrument, warn};
use webhook::{
    CapabilityCategory, CapabilityRegistry, ConfigStore, DocumentBackend, ValidationError,
    WebhookDraft, WebhookError, WebhookId, WebhookRecord, WebhookRecordValidator,
};

use crate::fields::{FieldError, FormFields, FormMode, OptionEntry, SubmitOutcome};

/// Drives one render/submit cycle of the webhook form.
///
/// Holds no state between requests other than the store's cached document.
/// Every failure is turned into a [`SubmitOutcome`]; nothing is returned as
/// an `Err` past [`Self::submit`].
pub struct WebhookFormController<B> {
    store: ConfigStore<B>,
    registry: CapabilityRegistry,
}

impl<B: DocumentBackend> WebhookFormController<B> {
    pub fn new(store: ConfigStore<B>, registry: CapabilityRegistry) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &ConfigStore<B> {
        &self.store
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Loads the current document so defaults can be populated from it.
    pub async fn prepare(&self) -> Result<(), WebhookError> {
        self.store.load().await
    }

    /// Values to pre-fill the form with.
    ///
    /// Empty for create mode and for ids that are not in the loaded document;
    /// the record's values plus its id otherwise.
    pub fn populate_defaults(&self, id: Option<WebhookId>) -> FormFields {
        let Some(id) = id else {
            return FormFields::default();
        };
        match self.store.webhook(id) {
            Some(record) => FormFields::from_record(&record),
            None => {
                warn!(webhook_id = %id, "No webhook to edit; showing an empty form");
                FormFields::default()
            }
        }
    }

    /// Choices for the processor or handler select input.
    ///
    /// Always starts with the empty placeholder entry.
    pub fn list_options(&self, category: CapabilityCategory) -> Vec<OptionEntry> {
        let registered = self.registry.entries(category);
        let mut options = Vec::with_capacity(registered.len() + 1);
        options.push(OptionEntry::placeholder());
        options.extend(registered.iter().map(|(name, label)| OptionEntry {
            value: name.to_string(),
            label: label.clone(),
        }));
        options
    }

    /// Validates `fields` and stores them.
    ///
    /// Checks run in order and stop at the first failing stage: required
    /// inputs, registered processor/handler, then selector uniqueness against
    /// freshly loaded state.
    #[instrument(skip(self, fields), fields(mode = ?fields.mode(), selector = %fields.selector))]
    pub async fn submit(&self, fields: FormFields) -> SubmitOutcome {
        let draft = match fields.to_draft() {
            Ok(draft) => draft,
            Err(err) => {
                let field_errors = fields
                    .missing_fields()
                    .into_iter()
                    .map(FieldError::required)
                    .collect();
                info!(%err, "Submission rejected");
                return SubmitOutcome::invalid(err.to_string(), field_errors);
            }
        };

        if let Some(outcome) = self.check_capabilities(&draft) {
            return outcome;
        }

        let mode = fields.mode();
        let editing = match mode {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        };
        let validator = WebhookRecordValidator::new(&self.store);
        if let Err(err) = validator.validate_selector(&draft.selector, editing).await {
            return self.failure(err);
        }

        let saved = match mode {
            FormMode::Create => self.store.add_webhook(draft).await,
            FormMode::Edit(id) => {
                let record = WebhookRecord::from_draft(id, draft);
                self.store
                    .update_webhook(record.clone())
                    .await
                    .map(|()| record)
            }
        };

        match saved {
            Ok(record) => SubmitOutcome::saved(record),
            Err(err) => self.failure(err),
        }
    }

    fn check_capabilities(&self, draft: &WebhookDraft) -> Option<SubmitOutcome> {
        let checks = [
            ("processor", CapabilityCategory::Processors, &draft.processor),
            ("handler", CapabilityCategory::Handlers, &draft.handler),
        ];
        let field_errors: Vec<FieldError> = checks
            .into_iter()
            .filter(|(_, category, name)| !self.registry.contains(*category, name.as_str()))
            .map(|(field, category, name)| {
                let err = ValidationError::UnknownCapability {
                    category,
                    name: name.to_string(),
                };
                FieldError::new(field, err.to_string())
            })
            .collect();

        let first = field_errors.first()?.message.clone();
        info!(errors = field_errors.len(), "Submission names unregistered capabilities");
        Some(SubmitOutcome::invalid(first, field_errors))
    }

    fn failure(&self, err: WebhookError) -> SubmitOutcome {
        match err {
            WebhookError::Validation(err) => {
                let field = match &err {
                    ValidationError::DuplicateSelector { .. } => Some("selector"),
                    _ => None,
                };
                info!(%err, "Submission rejected");
                let message = err.to_string();
                let field_errors = field
                    .map(|field| vec![FieldError::new(field, message.clone())])
                    .unwrap_or_default();
                SubmitOutcome::invalid(message, field_errors)
            }
            WebhookError::NotFound { id } => {
                warn!(webhook_id = %id, "Edited webhook no longer exists");
                SubmitOutcome::save_failed()
            }
            WebhookError::Storage(err) => {
                error!(error = %err, "Failed to save webhook configuration");
                SubmitOutcome::save_failed()
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
