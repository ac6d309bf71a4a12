//! Webhook configuration domain for Hookdesk.
//!
//! This crate holds the webhook record and configuration document types, the
//! rules that keep the document consistent, the capability registry behind the
//! processor/handler option lists, and the [`ConfigStore`] that performs
//! whole-document CRUD.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Persistence is supplied through the [`DocumentBackend`] port; the `storage`
//! crate provides the file-backed and in-memory implementations.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`WebhookId`, `Selector`, `CapabilityName`) |
//! | [`types`] | `WebhookRecord`, `WebhookDraft`, `ConfigurationDocument` |
//! | [`errors`] | `WebhookError` and its validation/storage families |
//! | [`registry`] | Processor/handler capability registry and registrar trait |
//! | [`store`] | `ConfigStore` and the `DocumentBackend` port |
//! | [`validator`] | Duplicate-selector rule |

pub mod errors;
pub mod identifiers;
pub mod registry;
pub mod store;
pub mod types;
pub mod validator;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{StorageError, ValidationError, WebhookError};
pub use identifiers::{CapabilityName, Selector, WebhookId};
pub use registry::{
    BuiltinCapabilities, CapabilityCategory, CapabilityRegistrar, CapabilityRegistry,
    UnknownCategory,
};
pub use store::{ConfigStore, DocumentBackend};
pub use types::{ConfigurationDocument, WebhookDraft, WebhookRecord};
pub use validator::WebhookRecordValidator;
