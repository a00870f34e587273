//! Error types for graph construction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while building the module graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A static reference could not be resolved to a file.
    ///
    /// Carries both the module that holds the reference and the specifier
    /// that failed, so the operator can find the offending import.
    #[error("unresolved reference '{specifier}' in {}", .importer.display())]
    UnresolvedReference {
        /// Module containing the reference
        importer: PathBuf,
        /// The specifier as written in source
        specifier: String,
    },

    /// The entry point itself does not exist.
    #[error("entry point not found: {}", .0.display())]
    EntryNotFound(PathBuf),

    /// Reading a module's source failed.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A module's source was not valid UTF-8.
    #[error("module is not valid UTF-8: {}", .0.display())]
    InvalidUtf8(PathBuf),
}
