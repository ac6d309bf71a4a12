use std::sync::atomic::{AtomicBool, Ordering};

use storage::MemoryBackend;
use webhook::{
    CapabilityName, CapabilityRegistrar, ConfigurationDocument, Selector, StorageError,
};

use super::*;
use crate::fields::SubmitStatus;

fn fields(name: &str, selector: &str) -> FormFields {
    FormFields {
        id: None,
        name: name.to_string(),
        selector: selector.to_string(),
        processor: "JSON".to_string(),
        handler: "Logger".to_string(),
        description: "d".to_string(),
    }
}

fn controller() -> WebhookFormController<MemoryBackend> {
    WebhookFormController::new(
        ConfigStore::new(MemoryBackend::new()),
        CapabilityRegistry::with_builtins(),
    )
}

async fn controller_with_s1() -> WebhookFormController<MemoryBackend> {
    let controller = controller();
    let outcome = controller.submit(fields("A", "s1")).await;
    assert!(outcome.is_success(), "{outcome:?}");
    controller
}

/// Backend whose reads or writes can be switched off.
#[derive(Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

fn flaky_controller() -> WebhookFormController<FlakyBackend> {
    WebhookFormController::new(
        ConfigStore::new(FlakyBackend::default()),
        CapabilityRegistry::with_builtins(),
    )
}

#[async_trait::async_trait]
impl DocumentBackend for FlakyBackend {
    async fn read(&self) -> Result<Option<ConfigurationDocument>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                path: "webhooks.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"),
            });
        }
        self.inner.read().await
    }

    async fn write(&self, document: &ConfigurationDocument) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                path: "webhooks.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.write(document).await
    }
}

#[tokio::test]
async fn test_create_on_empty_store_allocates_id_one() {
    let controller = controller();

    let outcome = controller.submit(fields("A", "s1")).await;

    assert_eq!(outcome.status, SubmitStatus::Success);
    assert_eq!(outcome.message, "Webhook inserted.");
    let record = outcome.record.unwrap();
    assert_eq!(record.id, WebhookId::new(1));
    assert_eq!(record.selector, Selector::new("s1").unwrap());

    let document = controller.store().backend().snapshot().unwrap();
    assert_eq!(document.sequence, 2);
    assert_eq!(document.webhooks.len(), 1);
}

#[tokio::test]
async fn test_each_create_takes_prior_sequence() {
    let controller = controller_with_s1().await;
    for (n, selector) in ["s2", "s3", "s4"].into_iter().enumerate() {
        let before = controller.store().backend().snapshot().unwrap().sequence;
        let outcome = controller.submit(fields(&format!("H{n}"), selector)).await;
        assert_eq!(outcome.record.unwrap().id, WebhookId::new(before));
        assert_eq!(
            controller.store().backend().snapshot().unwrap().sequence,
            before + 1
        );
    }
}

#[tokio::test]
async fn test_duplicate_selector_names_existing_webhook() {
    let controller = controller_with_s1().await;

    let outcome = controller.submit(fields("B", "s1")).await;

    assert_eq!(outcome.status, SubmitStatus::Error);
    assert_eq!(
        outcome.message,
        "The selector 's1' already set for the 'A' webhook."
    );
    assert_eq!(outcome.field_errors.len(), 1);
    assert_eq!(outcome.field_errors[0].field, "selector");
    assert_eq!(controller.store().backend().snapshot().unwrap().sequence, 2);
}

#[tokio::test]
async fn test_edit_with_own_selector_succeeds() {
    let controller = controller_with_s1().await;
    controller.prepare().await.unwrap();
    let mut edited = controller.populate_defaults(Some(WebhookId::new(1)));
    edited.description = "updated".to_string();

    let outcome = controller.submit(edited).await;

    assert!(outcome.is_success(), "{outcome:?}");
    let stored = controller.store().webhook(WebhookId::new(1)).unwrap();
    assert_eq!(stored.description, "updated");
    assert_eq!(stored.selector.as_str(), "s1");
    assert_eq!(controller.store().get().sequence, 2);
}

#[tokio::test]
async fn test_edit_onto_other_selector_is_rejected() {
    let controller = controller_with_s1().await;
    assert!(controller.submit(fields("B", "s2")).await.is_success());

    let mut edited = fields("B", "s1");
    edited.id = Some(WebhookId::new(2));
    let outcome = controller.submit(edited).await;

    assert_eq!(outcome.status, SubmitStatus::Error);
    assert!(outcome.message.contains("'A' webhook"));
}

#[tokio::test]
async fn test_edit_of_missing_id_is_generic_save_failure() {
    let controller = controller_with_s1().await;
    let mut edited = fields("Ghost", "ghost");
    edited.id = Some(WebhookId::new(42));

    let outcome = controller.submit(edited).await;

    assert_eq!(outcome.status, SubmitStatus::Error);
    assert_eq!(outcome.message, "Error during save process");
    assert!(outcome.field_errors.is_empty());
}

#[tokio::test]
async fn test_missing_required_fields_are_listed() {
    let controller = controller();
    let outcome = controller
        .submit(FormFields {
            name: String::new(),
            handler: String::new(),
            ..fields("A", "s1")
        })
        .await;

    assert_eq!(outcome.status, SubmitStatus::Error);
    let fields: Vec<_> = outcome.field_errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "handler"]);
    assert_eq!(
        outcome.field_errors[0].message,
        "Webhook Name is a required field."
    );
    assert!(controller.store().backend().snapshot().is_none());
}

#[tokio::test]
async fn test_unregistered_processor_is_rejected() {
    let controller = controller();
    let outcome = controller
        .submit(FormFields {
            processor: "YAML".to_string(),
            ..fields("A", "s1")
        })
        .await;

    assert_eq!(outcome.status, SubmitStatus::Error);
    assert_eq!(outcome.field_errors[0].field, "processor");
    assert_eq!(outcome.message, "'YAML' is not a registered processor option");
}

#[tokio::test]
async fn test_storage_failure_is_generic_and_leaves_document() {
    let controller = flaky_controller();
    assert!(controller.submit(fields("A", "s1")).await.is_success());
    let before = controller.store().get();
    controller
        .store()
        .backend()
        .fail_writes
        .store(true, Ordering::SeqCst);

    let outcome = controller.submit(fields("B", "s2")).await;

    assert_eq!(outcome.message, SubmitOutcome::SAVE_FAILED);
    assert_eq!(controller.store().get(), before);
    assert_eq!(controller.store().backend().inner.snapshot(), Some(before));
}

#[tokio::test]
async fn test_unreadable_store_is_generic_save_failure() {
    let controller = flaky_controller();
    assert!(controller.submit(fields("A", "s1")).await.is_success());
    let before = controller.store().get();
    controller
        .store()
        .backend()
        .fail_reads
        .store(true, Ordering::SeqCst);

    let outcome = controller.submit(fields("B", "s2")).await;

    assert_eq!(outcome.status, SubmitStatus::Error);
    assert_eq!(outcome.message, SubmitOutcome::SAVE_FAILED);
    assert!(outcome.field_errors.is_empty());
    assert!(outcome.record.is_none());
    assert_eq!(controller.store().get(), before);
    assert_eq!(controller.store().backend().inner.snapshot(), Some(before));
}

#[tokio::test]
async fn test_populate_defaults_modes() {
    let controller = controller_with_s1().await;

    assert!(controller.populate_defaults(None).is_empty());
    assert!(controller
        .populate_defaults(Some(WebhookId::new(99)))
        .is_empty());

    let defaults = controller.populate_defaults(Some(WebhookId::new(1)));
    assert_eq!(defaults.id, Some(WebhookId::new(1)));
    assert_eq!(defaults.name, "A");
    assert_eq!(defaults.processor, "JSON");
    assert_eq!(defaults.handler, "Logger");
}

#[tokio::test]
async fn test_populate_defaults_does_not_load_implicitly() {
    let mut document = ConfigurationDocument::default();
    let record = WebhookRecord {
        id: WebhookId::new(1),
        name: "A".to_string(),
        selector: Selector::new("s1").unwrap(),
        processor: CapabilityName::new("XML").unwrap(),
        handler: CapabilityName::new("Logger").unwrap(),
        description: String::new(),
    };
    document.webhooks.insert(record.id, record);
    document.sequence = 2;
    let controller = WebhookFormController::new(
        ConfigStore::new(MemoryBackend::with_document(document)),
        CapabilityRegistry::with_builtins(),
    );

    assert!(controller.populate_defaults(Some(WebhookId::new(1))).is_empty());
    controller.prepare().await.unwrap();
    assert_eq!(
        controller.populate_defaults(Some(WebhookId::new(1))).processor,
        "XML"
    );
}

#[test]
fn test_list_options_starts_with_placeholder() {
    let controller = controller();

    let handlers = controller.list_options(CapabilityCategory::Handlers);
    assert_eq!(
        handlers,
        vec![
            OptionEntry::placeholder(),
            OptionEntry {
                value: "Logger".to_string(),
                label: "DB Logger".to_string(),
            },
        ]
    );
    assert_eq!(handlers[0].label, "- select -");

    let processors = controller.list_options(CapabilityCategory::Processors);
    let values: Vec<_> = processors.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, vec!["", "Dummy", "JSON", "UrlEncodedForm", "XML"]);
}

#[tokio::test]
async fn test_registered_extension_is_offered_and_accepted() {
    struct SlackHandler;

    impl CapabilityRegistrar for SlackHandler {
        fn register(&self, registry: &mut CapabilityRegistry) {
            registry.register_handler(CapabilityName::new("Slack").unwrap(), "Slack relay");
        }
    }

    let mut registry = CapabilityRegistry::with_builtins();
    registry.extend_with(&SlackHandler);
    let controller = WebhookFormController::new(ConfigStore::new(MemoryBackend::new()), registry);

    let handlers = controller.list_options(CapabilityCategory::Handlers);
    assert_eq!(handlers.last().unwrap().value, "Slack");

    let outcome = controller
        .submit(FormFields {
            handler: "Slack".to_string(),
            ..fields("A", "s1")
        })
        .await;
    assert!(outcome.is_success(), "{outcome:?}");
}
