//! `hookdesk.toml` parsing.
//!
//! ```toml
//! store_path = "webhooks.json"
//! log_format = "json"
//!
//! [[processors]]
//! name = "CSV"
//! label = "Comma separated"
//!
//! [[handlers]]
//! name = "Slack"
//! label = "Slack relay"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use webhook::{CapabilityCategory, CapabilityName, CapabilityRegistrar, CapabilityRegistry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// A processor or handler declared in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapabilityEntry {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// JSON document holding the webhook configuration.
    pub store_path: PathBuf,
    pub log_format: LogFormat,
    /// Extra processors offered after the built-in ones.
    pub processors: Vec<CapabilityEntry>,
    /// Extra handlers offered after the built-in one.
    pub handlers: Vec<CapabilityEntry>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("webhooks.json"),
            log_format: LogFormat::default(),
            processors: Vec::new(),
            handlers: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Reads `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)
                .with_context(|| format!("invalid config file '{}'", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("cannot read config file '{}'", path.display()))
            }
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl CapabilityRegistrar for CliConfig {
    fn register(&self, registry: &mut CapabilityRegistry) {
        let declared = [
            (CapabilityCategory::Processors, &self.processors),
            (CapabilityCategory::Handlers, &self.handlers),
        ];
        for (category, entries) in declared {
            for entry in entries {
                match CapabilityName::new(entry.name.clone()) {
                    Some(name) => registry.register(category, name, entry.label.clone()),
                    None => warn!(%category, label = %entry.label, "Skipping capability with empty name"),
                }
            }
        }
    }
}
