//! Form field values, option entries, and submission outcomes.

use serde::{Deserialize, Serialize};
use webhook::{CapabilityName, Selector, ValidationError, WebhookDraft, WebhookId, WebhookRecord};

/// Key and display label of every required input, in form order.
pub const REQUIRED_FIELDS: [(&str, &str); 5] = [
    ("name", "Webhook Name"),
    ("selector", "Selector"),
    ("processor", "Processor"),
    ("handler", "Handler Class"),
    ("description", "Description"),
];

/// Whether a form run creates a new webhook or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(WebhookId),
}

impl From<Option<WebhookId>> for FormMode {
    fn from(id: Option<WebhookId>) -> Self {
        id.map_or(Self::Create, Self::Edit)
    }
}

/// Raw input values of the webhook form.
///
/// `id` is only present in edit mode and is never user-editable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WebhookId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub processor: String,
    #[serde(default)]
    pub handler: String,
    #[serde(default)]
    pub description: String,
}

impl FormFields {
    /// Pre-filled values for editing `record`.
    pub fn from_record(record: &WebhookRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name.clone(),
            selector: record.selector.to_string(),
            processor: record.processor.to_string(),
            handler: record.handler.to_string(),
            description: record.description.clone(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.id.into()
    }

    /// Returns `true` if no id and no input values are set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the value of the input named `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "selector" => Some(&self.selector),
            "processor" => Some(&self.processor),
            "handler" => Some(&self.handler),
            "description" => Some(&self.description),
            _ => None,
        }
    }

    /// Keys of required inputs left empty, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .filter(|(key, _)| self.value(key).is_some_and(str::is_empty))
            .map(|(key, _)| *key)
            .collect()
    }

    /// Converts the values into a draft, failing if any required input is
    /// empty.
    pub fn to_draft(&self) -> Result<WebhookDraft, ValidationError> {
        let missing = self.missing_fields();
        let selector = Selector::new(self.selector.clone());
        let processor = CapabilityName::new(self.processor.clone());
        let handler = CapabilityName::new(self.handler.clone());

        match (selector, processor, handler) {
            (Some(selector), Some(processor), Some(handler)) if missing.is_empty() => {
                Ok(WebhookDraft {
                    name: self.name.clone(),
                    selector,
                    processor,
                    handler,
                    description: self.description.clone(),
                })
            }
            _ => Err(ValidationError::MissingFields {
                fields: missing.into_iter().map(String::from).collect(),
            }),
        }
    }
}

/// One entry of a select input: submitted value and display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub value: String,
    pub label: String,
}

impl OptionEntry {
    /// The leading "nothing chosen" entry of every option list.
    pub fn placeholder() -> Self {
        Self {
            value: String::new(),
            label: "- select -".to_string(),
        }
    }
}

/// A message attached to one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The standard message for an empty required input.
    pub fn required(field: &str) -> Self {
        let label = REQUIRED_FIELDS
            .iter()
            .find(|(key, _)| *key == field)
            .map_or(field, |(_, label)| *label);
        Self::new(field, format!("{label} is a required field."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    Success,
    Error,
}

/// What a submission produced, ready for the caller to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub status: SubmitStatus,
    /// Form-level message.
    pub message: String,
    /// Per-input messages; empty unless validation failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    /// The stored record on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<WebhookRecord>,
}

impl SubmitOutcome {
    pub const SAVED: &'static str = "Webhook inserted.";
    pub const SAVE_FAILED: &'static str = "Error during save process";

    pub fn saved(record: WebhookRecord) -> Self {
        Self {
            status: SubmitStatus::Success,
            message: Self::SAVED.to_string(),
            field_errors: Vec::new(),
            record: Some(record),
        }
    }

    pub fn invalid(message: impl Into<String>, field_errors: Vec<FieldError>) -> Self {
        Self {
            status: SubmitStatus::Error,
            message: message.into(),
            field_errors,
            record: None,
        }
    }

    pub fn save_failed() -> Self {
        Self::invalid(Self::SAVE_FAILED, Vec::new())
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmitStatus::Success
    }
}
