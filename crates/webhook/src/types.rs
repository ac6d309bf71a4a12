//! Webhook record and configuration document types.
//!
//! [`ConfigurationDocument`] is the whole persisted state. It is always read
//! and written as a unit; there are no per-record writes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{CapabilityName, Selector, WebhookId};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A configured association of a selector with a processor and a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRecord {
    /// Store-assigned identifier; stable once allocated.
    pub id: WebhookId,
    /// Human label shown in option lists and error messages.
    pub name: String,
    /// Dispatch key; unique across the document.
    pub selector: Selector,
    /// Registered processor capability.
    pub processor: CapabilityName,
    /// Registered handler capability.
    pub handler: CapabilityName,
    /// Free text.
    pub description: String,
}

impl WebhookRecord {
    /// Builds a record from a draft and the id the store allocated for it.
    pub fn from_draft(id: WebhookId, draft: WebhookDraft) -> Self {
        Self {
            id,
            name: draft.name,
            selector: draft.selector,
            processor: draft.processor,
            handler: draft.handler,
            description: draft.description,
        }
    }
}

/// A webhook that has not been stored yet and so has no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookDraft {
    pub name: String,
    pub selector: Selector,
    pub processor: CapabilityName,
    pub handler: CapabilityName,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The full persisted configuration: an id sequence plus every webhook.
///
/// `webhooks` keeps insertion order, which is also listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    /// Next id to allocate.
    pub sequence: u64,
    /// Records keyed by their own id.
    #[serde(default)]
    pub webhooks: IndexMap<WebhookId, WebhookRecord>,
}

impl Default for ConfigurationDocument {
    fn default() -> Self {
        Self {
            sequence: 1,
            webhooks: IndexMap::new(),
        }
    }
}

impl ConfigurationDocument {
    /// Returns the record with `id`, if present.
    pub fn webhook(&self, id: WebhookId) -> Option<&WebhookRecord> {
        self.webhooks.get(&id)
    }

    /// Returns the first record, in listing order, whose selector equals
    /// `selector` exactly, skipping the record with id `exclude`.
    ///
    /// Stops at the first match.
    pub fn find_selector_conflict(
        &self,
        selector: &Selector,
        exclude: Option<WebhookId>,
    ) -> Option<&WebhookRecord> {
        self.webhooks
            .values()
            .filter(|hook| Some(hook.id) != exclude)
            .find(|hook| &hook.selector == selector)
    }

    /// Checks every document invariant, returning a description of the first
    /// one that fails.
    ///
    /// - each record's id equals its key,
    /// - names and selectors are non-empty,
    /// - selectors are unique,
    /// - `sequence` is at least 1 and above every allocated id.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.sequence == 0 {
            return Err("sequence must be at least 1".to_string());
        }

        let mut seen = std::collections::HashMap::with_capacity(self.webhooks.len());
        for (key, hook) in &self.webhooks {
            if *key != hook.id {
                return Err(format!("webhook stored under key {key} has id {}", hook.id));
            }
            if hook.id.as_u64() >= self.sequence {
                return Err(format!(
                    "webhook id {} is not below sequence {}",
                    hook.id, self.sequence
                ));
            }
            if hook.name.is_empty() {
                return Err(format!("webhook {} has an empty name", hook.id));
            }
            if hook.selector.is_empty() {
                return Err(format!("webhook {} has an empty selector", hook.id));
            }
            if let Some(other) = seen.insert(hook.selector.as_str(), hook.id) {
                return Err(format!(
                    "selector '{}' is used by webhooks {other} and {}",
                    hook.selector, hook.id
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, name: &str, selector: &str) -> WebhookRecord {
        WebhookRecord {
            id: WebhookId::new(id),
            name: name.to_string(),
            selector: Selector::new(selector).unwrap(),
            processor: CapabilityName::new("JSON").unwrap(),
            handler: CapabilityName::new("Logger").unwrap(),
            description: "d".to_string(),
        }
    }

    fn document(records: Vec<WebhookRecord>) -> ConfigurationDocument {
        let sequence = records.iter().map(|r| r.id.as_u64()).max().unwrap_or(0) + 1;
        ConfigurationDocument {
            sequence,
            webhooks: records.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    #[test]
    fn test_default_document_is_empty_with_sequence_one() {
        let doc = ConfigurationDocument::default();
        assert_eq!(doc.sequence, 1);
        assert!(doc.webhooks.is_empty());
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_find_selector_conflict_skips_excluded_id() {
        let doc = document(vec![record(1, "A", "s1"), record(2, "B", "s2")]);
        let s1 = Selector::new("s1").unwrap();

        assert_eq!(doc.find_selector_conflict(&s1, None).unwrap().name, "A");
        assert!(doc
            .find_selector_conflict(&s1, Some(WebhookId::new(1)))
            .is_none());
        assert_eq!(
            doc.find_selector_conflict(&s1, Some(WebhookId::new(2)))
                .unwrap()
                .id,
            WebhookId::new(1)
        );
    }

    #[test]
    fn test_find_selector_conflict_is_case_sensitive() {
        let doc = document(vec![record(1, "A", "Orders")]);
        let lower = Selector::new("orders").unwrap();
        assert!(doc.find_selector_conflict(&lower, None).is_none());
    }

    #[test]
    fn test_invariants_reject_duplicate_selectors() {
        let doc = document(vec![record(1, "A", "s1"), record(2, "B", "s1")]);
        let err = doc.check_invariants().unwrap_err();
        assert!(err.contains("s1"));
    }

    #[test]
    fn test_invariants_reject_stale_sequence() {
        let mut doc = document(vec![record(3, "A", "s1")]);
        doc.sequence = 3;
        assert!(doc.check_invariants().is_err());
    }

    #[test]
    fn test_invariants_reject_mismatched_key() {
        let mut doc = ConfigurationDocument {
            sequence: 5,
            webhooks: IndexMap::new(),
        };
        doc.webhooks.insert(WebhookId::new(1), record(2, "A", "s1"));
        assert!(doc.check_invariants().unwrap_err().contains("key 1"));
    }

    #[test]
    fn test_document_json_layout() {
        let doc = document(vec![record(1, "A", "s1")]);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["sequence"], 2);
        assert_eq!(value["webhooks"]["1"]["selector"], "s1");
        assert_eq!(value["webhooks"]["1"]["id"], 1);
    }

    #[test]
    fn test_document_preserves_insertion_order() {
        let doc = document(vec![record(2, "B", "s2"), record(1, "A", "s1")]);
        let json = serde_json::to_string(&doc).unwrap();
        let back: ConfigurationDocument = serde_json::from_str(&json).unwrap();
        let names: Vec<_> = back.webhooks.values().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
