//! Typed entry compile stage.
//!
//! Type-checks and transpiles typed glue source into plain script before the
//! bundler sees it. The actual compiler is external; [`TypedCompiler`] is
//! the seam, with [`CommandTypedCompiler`] as the production implementation
//! that spawns a configured executable per file.
//!
//! External compiler contract: invoked as `<command> <args...> <file>`, it
//! prints the transformed plain source on stdout and exits zero, or exits
//! non-zero with one diagnostic per stderr line. All diagnostics are
//! reported, not just the first; a failure is fatal to the current pass but
//! not to the process.

use crate::error::{Diagnostic, Error, Result};
use crate::plugin::Plugin;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Outcome of a failed typed compile: every diagnostic found.
#[derive(Debug, Clone)]
pub struct TypedCompileFailure {
    /// Diagnostics in compiler output order
    pub diagnostics: Vec<Diagnostic>,
}

/// Transforms typed source into plain executable source.
pub trait TypedCompiler: Send + Sync {
    /// Transform `source` from `path`, or report every diagnostic.
    fn transform(&self, path: &Path, source: &str) -> Result<String, TypedCompileFailure>;
}

/// Production compiler: spawns an external executable per file.
pub struct CommandTypedCompiler {
    command: String,
    args: Vec<String>,
}

impl CommandTypedCompiler {
    /// Create a compiler invoking `command` with leading `args`.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl TypedCompiler for CommandTypedCompiler {
    fn transform(&self, path: &Path, _source: &str) -> Result<String, TypedCompileFailure> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| TypedCompileFailure {
                diagnostics: vec![Diagnostic {
                    file: path.to_path_buf(),
                    message: format!("failed to spawn '{}': {e}", self.command),
                }],
            })?;

        if output.status.success() {
            return String::from_utf8(output.stdout).map_err(|_| TypedCompileFailure {
                diagnostics: vec![Diagnostic {
                    file: path.to_path_buf(),
                    message: "compiler produced non-UTF-8 output".to_string(),
                }],
            });
        }

        let diagnostics = String::from_utf8_lossy(&output.stderr)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Diagnostic {
                file: path.to_path_buf(),
                message: line.to_string(),
            })
            .collect();
        Err(TypedCompileFailure { diagnostics })
    }
}

/// Pipeline stage routing typed source through a [`TypedCompiler`].
///
/// Which files reach this stage is decided by module rules (suffix match
/// plus exclude patterns), not by the plugin itself.
pub struct TypedEntryPlugin {
    compiler: Box<dyn TypedCompiler>,
}

impl TypedEntryPlugin {
    /// Create the stage over any compiler implementation.
    pub fn new(compiler: Box<dyn TypedCompiler>) -> Self {
        Self { compiler }
    }

    /// Create the stage over an external command.
    pub fn command(command: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(Box::new(CommandTypedCompiler::new(command, args)))
    }
}

impl Plugin for TypedEntryPlugin {
    fn name(&self) -> &str {
        "typed-entry"
    }

    fn transform_module(&self, path: &Path, source: &str) -> Result<String> {
        debug!("typed compile: {}", path.display());
        self.compiler
            .transform(path, source)
            .map_err(|failure| Error::TypeCheck {
                diagnostics: failure.diagnostics,
            })
    }
}
