//! Module identity and resolved module data.
//!
//! A [`ModuleId`] is the canonical identity of a module within one build
//! pass: its cleaned absolute path. Virtual modules (injected by plugins,
//! never present on disk before the build) use the same path-shaped identity
//! so that resolution and rule matching treat them like ordinary files.

use path_clean::PathClean;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical module identity: a cleaned absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleId(PathBuf);

impl ModuleId {
    /// Create an id from a path, cleaning `.` and `..` components.
    ///
    /// Relative paths are accepted (tests use them) but real builds always
    /// pass absolute paths produced by the resolver.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into().clean())
    }

    /// The underlying path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Render the id relative to a base directory, for bundle-internal keys
    /// and report output. Falls back to the full path when the module lies
    /// outside the base.
    pub fn relative_to(&self, base: &Path) -> String {
        self.0
            .strip_prefix(base)
            .unwrap_or(&self.0)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&Path> for ModuleId {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// What kind of content a module holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModuleKind {
    /// Plain executable script (hand-written or produced by a compile stage)
    Script,
    /// Binary payload (wasm); never scanned for references
    Binary,
}

/// A module after resolution, with its scanned references.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    /// Canonical identity
    pub id: ModuleId,
    /// Script or binary
    pub kind: ModuleKind,
    /// Source text (empty for binary modules)
    pub source: String,
    /// Outgoing references: specifier as written, plus the id it resolved to
    pub references: Vec<(String, ModuleId)>,
    /// Whether this module was injected by a plugin rather than read from disk
    pub virtual_module: bool,
}

impl ResolvedModule {
    /// Construct a script module with no references yet.
    pub fn script(id: ModuleId, source: String) -> Self {
        Self {
            id,
            kind: ModuleKind::Script,
            source,
            references: Vec::new(),
            virtual_module: false,
        }
    }
}
