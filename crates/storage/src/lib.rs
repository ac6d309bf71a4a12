//! Hookdesk storage infrastructure adapter.
//!
//! Implements the [`webhook::DocumentBackend`] port:
//!
//! - [`JsonFileBackend`]: one pretty-printed JSON file, replaced atomically
//!   on every write (temp file + rename).
//! - [`MemoryBackend`]: process-local, for tests and dry runs.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File paths, encoding, and write atomicity live here.
//! The [`webhook`] crate sees only [`webhook::DocumentBackend`].

mod json_file;
mod memory;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
