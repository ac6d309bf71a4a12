//! Hookdesk webhook form controller.
//!
//! Orchestrates one create/edit cycle of a webhook record: pre-filling the
//! form, building the processor/handler option lists from the capability
//! registry, and validating and persisting a submission.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The controller sequences calls between the rules
//! in the [`webhook`] crate and whichever [`webhook::DocumentBackend`] the
//! composition root supplies. It contains no domain rules of its own and no
//! rendering; callers turn [`SubmitOutcome`] into output.

mod controller;
mod fields;

pub use controller::WebhookFormController;
pub use fields::{
    FieldError, FormFields, FormMode, OptionEntry, SubmitOutcome, SubmitStatus, REQUIRED_FIELDS,
};
