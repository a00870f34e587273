//! Specifier resolution with ordered extension trial.
//!
//! Resolution tries, in order: the specifier as written, then each
//! configured extension appended, then `index` files inside a directory of
//! that name. Virtual modules registered by plugins are consulted before the
//! filesystem at every step, so a plugin-injected module shadows a file of
//! the same name and satisfies references to paths that do not exist on disk
//! prior to the build.

use crate::error::GraphError;
use crate::module::ModuleId;
use path_clean::PathClean;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Registry of plugin-injected modules, keyed by the path they occupy.
///
/// Entries hold the module's content so the walker can load it without
/// touching disk: script source for loader glue, raw bytes for binary
/// payloads.
#[derive(Debug, Default)]
pub struct VirtualModules {
    entries: HashMap<PathBuf, VirtualEntry>,
}

#[derive(Debug, Clone)]
pub(crate) enum VirtualEntry {
    Script(String),
    Binary(Vec<u8>),
}

impl VirtualModules {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script module at `path`.
    pub fn insert_script(&mut self, path: impl Into<PathBuf>, source: String) {
        self.entries
            .insert(path.into().clean(), VirtualEntry::Script(source));
    }

    /// Register a binary module at `path`.
    pub fn insert_binary(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.entries
            .insert(path.into().clean(), VirtualEntry::Binary(bytes));
    }

    /// Whether any module is registered at `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&path.to_path_buf().clean())
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of a registered binary module, if `path` holds one.
    pub fn binary_bytes(&self, path: &Path) -> Option<&[u8]> {
        match self.entries.get(&path.to_path_buf().clean()) {
            Some(VirtualEntry::Binary(bytes)) => Some(bytes),
            _ => None,
        }
    }

    pub(crate) fn get(&self, path: &Path) -> Option<&VirtualEntry> {
        self.entries.get(&path.to_path_buf().clean())
    }
}

/// Resolve `specifier` as referenced from `importer`.
///
/// Only relative (`./`, `../`) and absolute specifiers are resolvable; bare
/// package names fail with [`GraphError::UnresolvedReference`] since this
/// bundler has no package registry to consult.
///
/// `extensions` is the ordered list of suffixes tried after the literal
/// path, e.g. `[".js", ".wasm"]`.
pub fn resolve_specifier(
    specifier: &str,
    importer: &Path,
    extensions: &[String],
    virtuals: &VirtualModules,
) -> Result<ModuleId, GraphError> {
    let unresolved = || GraphError::UnresolvedReference {
        importer: importer.to_path_buf(),
        specifier: specifier.to_string(),
    };

    if !specifier.starts_with('.') && !specifier.starts_with('/') {
        return Err(unresolved());
    }

    let base = if specifier.starts_with('/') {
        PathBuf::new()
    } else {
        importer.parent().unwrap_or(Path::new("")).to_path_buf()
    };
    let candidate = base.join(specifier).clean();

    // Literal path first, then each extension in configured order.
    if let Some(found) = try_candidate(&candidate, virtuals) {
        return Ok(found);
    }
    for ext in extensions {
        let with_ext = append_extension(&candidate, ext);
        if let Some(found) = try_candidate(&with_ext, virtuals) {
            return Ok(found);
        }
    }

    // Directory reference: try index files.
    if candidate.is_dir() || virtuals_has_prefix(virtuals, &candidate) {
        for ext in extensions {
            let index = candidate.join(format!("index{ext}"));
            if let Some(found) = try_candidate(&index, virtuals) {
                return Ok(found);
            }
        }
    }

    Err(unresolved())
}

fn try_candidate(path: &Path, virtuals: &VirtualModules) -> Option<ModuleId> {
    if virtuals.contains(path) {
        return Some(ModuleId::new(path));
    }
    if path.is_file() {
        return Some(ModuleId::new(path));
    }
    None
}

fn virtuals_has_prefix(virtuals: &VirtualModules, dir: &Path) -> bool {
    virtuals.entries.keys().any(|p| p.starts_with(dir))
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(ext);
    PathBuf::from(s)
}
