//! Error taxonomy for the bundler core.
//!
//! Every stage failure aborts the current build pass; nothing here is
//! recoverable mid-pass. The watch loop in the CLI catches these, surfaces
//! them, and waits for the next change event.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundler operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A single compiler diagnostic from the typed-entry stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the diagnostic refers to
    pub file: PathBuf,
    /// Compiler message, verbatim
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Bundler error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    /// A base directory could not be resolved to an absolute location.
    #[error("path resolution failed for '{}': {reason}", .path.display())]
    PathResolution {
        /// The path that failed to resolve
        path: PathBuf,
        /// Why resolution failed
        reason: String,
    },

    /// The external wasm compiler terminated non-zero.
    ///
    /// `stderr` carries the compiler's diagnostics verbatim; kiln does not
    /// interpret or translate them.
    #[error("native module compile failed ({status}):\n{stderr}")]
    NativeCompile {
        /// Exit status description of the sub-process
        status: String,
        /// The sub-process's stderr, untouched
        stderr: String,
    },

    /// The external wasm compiler produced no artifact at the conventional
    /// location.
    #[error("native compile produced no .wasm artifact under {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// An asset pattern matched zero files in strict mode.
    #[error("asset pattern '{pattern}' matched no files")]
    AssetNotFound {
        /// The offending pattern
        pattern: String,
    },

    /// Graph construction failure: unresolved reference, missing entry,
    /// unreadable module.
    #[error(transparent)]
    Graph(#[from] kiln_graph::GraphError),

    /// The typed-entry compile stage reported type errors.
    ///
    /// Carries every diagnostic found, not just the first. Fatal to the
    /// current pass but not to the process.
    #[error("type check failed with {} diagnostic(s)", .diagnostics.len())]
    TypeCheck {
        /// All diagnostics, in compiler output order
        diagnostics: Vec<Diagnostic>,
    },

    /// An emitted file path would escape the output directory.
    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    /// Writing the output batch failed; any temp files were rolled back.
    #[error("write failure: {0}")]
    WriteFailure(String),

    /// Invalid build configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Render the full diagnostic list for a type-check failure, one per
    /// line. Other variants render their `Display` form.
    pub fn detail(&self) -> String {
        match self {
            Error::TypeCheck { diagnostics } => diagnostics
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_compile_keeps_stderr_verbatim() {
        let err = Error::NativeCompile {
            status: "exit code 101".to_string(),
            stderr: "error[E0425]: cannot find value `frob`".to_string(),
        };
        assert!(err.to_string().contains("error[E0425]"));
    }

    #[test]
    fn test_type_check_detail_lists_all_diagnostics() {
        let err = Error::TypeCheck {
            diagnostics: vec![
                Diagnostic {
                    file: PathBuf::from("a.ts"),
                    message: "TS2304: Cannot find name 'x'".to_string(),
                },
                Diagnostic {
                    file: PathBuf::from("b.ts"),
                    message: "TS2322: Type 'string' is not assignable".to_string(),
                },
            ],
        };
        let detail = err.detail();
        assert!(detail.contains("TS2304"));
        assert!(detail.contains("TS2322"));
        assert!(err.to_string().contains("2 diagnostic(s)"));
    }

    #[test]
    fn test_unresolved_reference_passes_through() {
        let graph_err = kiln_graph::GraphError::UnresolvedReference {
            importer: PathBuf::from("/p/main.js"),
            specifier: "./ghost".to_string(),
        };
        let err: Error = graph_err.into();
        let msg = err.to_string();
        assert!(msg.contains("./ghost"));
        assert!(msg.contains("main.js"));
    }
}
