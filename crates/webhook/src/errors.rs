//! Error taxonomy for the webhook configuration domain.
//!
//! [`WebhookError`] is the single error type crossing the store, validator and
//! controller boundaries. It splits into three families:
//!
//! - [`ValidationError`]: bad input (missing field, duplicate selector,
//!   unknown capability). Recoverable by correcting the form.
//! - [`WebhookError::NotFound`]: an update targeted an id that does not exist.
//! - [`StorageError`]: the backing store could not be read or written. Only
//!   recoverable outside this layer.
//!
//! Nothing in this layer retries. Every error needs new input, an existing
//! record or a repaired store before the operation can succeed.

use std::path::PathBuf;

use thiserror::Error;

use crate::{CapabilityCategory, Selector, WebhookId};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Errors produced by config store, validator and controller operations.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The submitted values or document break a validation rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An update referenced a webhook id that is not in the document.
    #[error("Webhook {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: WebhookId,
    },

    /// The backing store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl WebhookError {
    /// Returns `true` if this is a [`WebhookError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A rule violation in submitted values or in a candidate document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required form fields were empty.
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields {
        /// Field keys (`"name"`, `"selector"`, ...) in form order.
        fields: Vec<String>,
    },

    /// Another webhook already uses the selector.
    #[error("The selector '{selector}' already set for the '{webhook_name}' webhook.")]
    DuplicateSelector {
        /// The selector that collided.
        selector: Selector,
        /// Id of the record that already owns the selector.
        webhook_id: WebhookId,
        /// Display name of the record that already owns the selector.
        webhook_name: String,
    },

    /// A processor or handler name that is not in the capability registry.
    #[error("'{name}' is not a registered {} option", .category.singular())]
    UnknownCapability {
        /// Which option list the name was checked against.
        category: CapabilityCategory,
        /// The submitted name.
        name: String,
    },

    /// A whole document handed to `update` breaks a document invariant.
    #[error("Invalid configuration document: {message}")]
    InvalidDocument {
        /// Which invariant failed.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Failure reading or writing the persisted configuration document.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File-system level failure (permissions, missing directory, ...).
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The stored document could not be understood or breaks an invariant.
    #[error("Malformed configuration document: {message}")]
    Malformed {
        /// What was wrong with it.
        message: String,
    },

    /// The in-memory document could not be encoded.
    #[error("Failed to serialise configuration document: {0}")]
    Serialization(#[from] serde_json::Error),
}
