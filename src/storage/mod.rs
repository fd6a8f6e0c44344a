pub mod json_backend;
pub mod memory;

use std::path::Path;

use crate::domain::AppState;

pub use crate::core::errors::Result;

/// Abstraction over persistence backends that keep the whole application
/// state as a single document.
pub trait StorageBackend: Send + Sync {
    /// Reads the stored state. `Ok(None)` means nothing was saved yet.
    fn load(&self) -> Result<Option<AppState>>;
    /// Replaces the stored state with `state`.
    fn save(&self, state: &AppState) -> Result<()>;
    /// Removes the stored state entirely.
    fn clear(&self) -> Result<()>;

    /// Where the state lives, when it lives on disk.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// A serialized snapshot ready to be written wherever the user chooses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub contents: String,
}

pub use json_backend::{
    export_file_name, parse_import_document, render_export, write_export, JsonStorage,
    REQUIRED_IMPORT_FIELDS,
};
pub use memory::MemoryStorage;
