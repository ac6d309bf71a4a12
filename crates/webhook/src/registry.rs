//! Registry of processor and handler capability names.
//!
//! The registry is the extension point for option lists: it is built at
//! startup, offered to every [`CapabilityRegistrar`], and then handed to the
//! form controller as an explicit dependency. Names are opaque keys; the
//! behaviour behind them lives in the dispatch component, not here.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::CapabilityName;

/// Which option list a capability belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityCategory {
    /// Content processors that parse incoming payloads.
    Processors,
    /// Handlers that act on a parsed event.
    Handlers,
}

impl CapabilityCategory {
    /// Returns the category key as used in option queries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processors => "processors",
            Self::Handlers => "handlers",
        }
    }

    /// Names one entry of this category in user-facing messages.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Processors => "processor",
            Self::Handlers => "handler",
        }
    }
}

impl fmt::Display for CapabilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown category key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability category '{0}' (expected 'processors' or 'handlers')")]
pub struct UnknownCategory(pub String);

impl FromStr for CapabilityCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processors" => Ok(Self::Processors),
            "handlers" => Ok(Self::Handlers),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Something that contributes capability names at startup.
///
/// Collaborators implement this instead of hooking into a global dispatcher;
/// the composition root calls [`CapabilityRegistry::extend_with`] for each.
pub trait CapabilityRegistrar {
    /// Adds this collaborator's processors and handlers to `registry`.
    fn register(&self, registry: &mut CapabilityRegistry);
}

/// Ordered name → display label maps for processors and handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityRegistry {
    processors: IndexMap<CapabilityName, String>,
    handlers: IndexMap<CapabilityName, String>,
}

impl CapabilityRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in processors and handler.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        BuiltinCapabilities.register(&mut registry);
        registry
    }

    /// Registers `name` under `category`.
    ///
    /// Re-registering an existing name replaces its label and keeps its
    /// position in the option list.
    pub fn register(
        &mut self,
        category: CapabilityCategory,
        name: CapabilityName,
        label: impl Into<String>,
    ) {
        let label = label.into();
        debug!(%category, name = %name, label = %label, "Registering capability");
        self.entries_mut(category).insert(name, label);
    }

    /// Shorthand for registering a processor.
    pub fn register_processor(&mut self, name: CapabilityName, label: impl Into<String>) {
        self.register(CapabilityCategory::Processors, name, label);
    }

    /// Shorthand for registering a handler.
    pub fn register_handler(&mut self, name: CapabilityName, label: impl Into<String>) {
        self.register(CapabilityCategory::Handlers, name, label);
    }

    /// Lets `registrar` add its capabilities.
    pub fn extend_with(&mut self, registrar: &dyn CapabilityRegistrar) -> &mut Self {
        registrar.register(self);
        self
    }

    /// Returns `true` if `name` is registered under `category`.
    pub fn contains(&self, category: CapabilityCategory, name: &str) -> bool {
        self.entries(category).contains_key(name)
    }

    /// Iterates `(name, label)` pairs of `category` in registration order.
    pub fn entries(&self, category: CapabilityCategory) -> &IndexMap<CapabilityName, String> {
        match category {
            CapabilityCategory::Processors => &self.processors,
            CapabilityCategory::Handlers => &self.handlers,
        }
    }

    fn entries_mut(&mut self, category: CapabilityCategory) -> &mut IndexMap<CapabilityName, String> {
        match category {
            CapabilityCategory::Processors => &mut self.processors,
            CapabilityCategory::Handlers => &mut self.handlers,
        }
    }
}

/// The capabilities shipped with the extension itself.
pub struct BuiltinCapabilities;

impl BuiltinCapabilities {
    const PROCESSORS: &'static [(&'static str, &'static str)] = &[
        ("Dummy", "Dummy processor for testing"),
        ("JSON", "JSON"),
        ("UrlEncodedForm", "Url Encoded Form"),
        ("XML", "XML"),
    ];

    const HANDLERS: &'static [(&'static str, &'static str)] = &[("Logger", "DB Logger")];
}

impl CapabilityRegistrar for BuiltinCapabilities {
    fn register(&self, registry: &mut CapabilityRegistry) {
        let tables = [
            (CapabilityCategory::Processors, Self::PROCESSORS),
            (CapabilityCategory::Handlers, Self::HANDLERS),
        ];
        for (category, table) in tables {
            for &(name, label) in table {
                if let Some(name) = CapabilityName::new(name) {
                    registry.register(category, name, label);
                }
            }
        }
    }
}
