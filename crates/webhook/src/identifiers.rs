//! Newtype domain identifiers.
//!
//! Identity-bearing values get a distinct newtype so a [`Selector`] cannot be
//! passed where a [`CapabilityName`] is expected, even though both are strings
//! under the hood.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display,
// Borrow<str> (so maps keyed by the newtype can be queried with a &str).
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if the wrapped string is empty.
            ///
            /// Only possible for values deserialised from an unchecked source.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Integer-backed
// ---------------------------------------------------------------------------

/// Identifies a webhook record within the configuration document.
///
/// Allocated by the config store from the document's `sequence` counter and
/// never reused or changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookId(u64);

impl WebhookId {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WebhookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WebhookId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

// ---------------------------------------------------------------------------
// String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The matching key that routes an incoming event to one webhook record.
    ///
    /// Compared with exact, case-sensitive equality. No trimming or folding
    /// is applied anywhere.
    Selector
}

string_id! {
    /// Opaque key naming a registered processor or handler capability
    /// (e.g. `"JSON"`, `"Logger"`).
    CapabilityName
}
