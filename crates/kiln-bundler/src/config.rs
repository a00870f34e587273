//! Build configuration for a single bundler invocation.
//!
//! One declarative [`BuildConfig`] resolves into the ordered pipeline a
//! build pass executes. The typed and untyped glue-layer variants are the
//! same configuration; the typed variant simply carries a module rule that
//! routes `.ts` files through the typed-entry compile stage.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the emitted bundle loads the binary module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Wasm bytes are inlined into the bundle and instantiated synchronously
    /// at load time; exports are available immediately.
    Sync,
    /// Wasm is emitted as a separate artifact and instantiated in a
    /// non-blocking load phase; consumers await the loader's init promise
    /// before touching exports.
    #[default]
    AsyncWasm,
}

/// Routes files matching a suffix to a compile stage.
///
/// Rules are order-sensitive: the first rule whose suffix matches (and whose
/// exclude patterns don't) wins. Files matching no rule pass through
/// unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRule {
    /// File suffixes this rule applies to, e.g. `[".ts"]`
    pub suffixes: Vec<String>,
    /// Name of the plugin providing the compile stage
    pub stage: String,
    /// Path substrings that opt a file out, e.g. `["node_modules"]`
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ModuleRule {
    /// Whether this rule applies to `path`.
    pub fn matches(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        if !self.suffixes.iter().any(|s| text.ends_with(s.as_str())) {
            return false;
        }
        !self
            .exclude
            .iter()
            .any(|pattern| text.contains(pattern.as_str()))
    }
}

/// The root build configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Glue-layer entry point, relative to `cwd` or absolute
    pub entry: PathBuf,
    /// Project root all relative paths resolve against
    pub cwd: PathBuf,
    /// Output directory
    pub out_dir: PathBuf,
    /// Bundle file name within `out_dir`
    pub out_file: String,
    /// Ordered extension list tried during reference resolution
    pub resolve_extensions: Vec<String>,
    /// Ordered compile-stage routing rules
    pub module_rules: Vec<ModuleRule>,
    /// Sync or async wasm loading
    pub execution_mode: ExecutionMode,
}

impl BuildConfig {
    /// Create a configuration with the standard defaults: `dist/` output,
    /// `bundle.js`, `.js`/`.mjs`/`.wasm` extension order, async wasm.
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            cwd: PathBuf::from("."),
            out_dir: PathBuf::from("dist"),
            out_file: "bundle.js".to_string(),
            resolve_extensions: vec![
                ".js".to_string(),
                ".mjs".to_string(),
                ".ts".to_string(),
                ".wasm".to_string(),
            ],
            module_rules: Vec::new(),
            execution_mode: ExecutionMode::default(),
        }
    }

    /// Set the project root.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Set the output directory.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Set the bundle file name.
    pub fn out_file(mut self, name: impl Into<String>) -> Self {
        self.out_file = name.into();
        self
    }

    /// Replace the resolvable extension order.
    pub fn resolve_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolve_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Append a module rule.
    pub fn module_rule(mut self, rule: ModuleRule) -> Self {
        self.module_rules.push(rule);
        self
    }

    /// Set the execution mode.
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Entry point as an absolute path.
    pub fn entry_path(&self) -> PathBuf {
        if self.entry.is_absolute() {
            self.entry.clone()
        } else {
            self.cwd.join(&self.entry)
        }
    }

    /// First rule matching `path`, if any.
    pub fn rule_for(&self, path: &Path) -> Option<&ModuleRule> {
        self.module_rules.iter().find(|rule| rule.matches(path))
    }

    /// Validate the configuration before a pass.
    ///
    /// Checks that the entry point exists, that the output file name is a
    /// bare name, and that no rule is fully shadowed by an earlier one
    /// (first-match-wins makes a shadowed rule dead, which is always a
    /// configuration mistake).
    pub fn validate(&self) -> Result<()> {
        if !self.entry_path().is_file() {
            return Err(Error::Config(format!(
                "entry point does not exist: {}",
                self.entry_path().display()
            )));
        }

        if self.out_file.is_empty() || self.out_file.contains('/') || self.out_file.contains('\\') {
            return Err(Error::Config(format!(
                "output file name must be a bare file name, got '{}'",
                self.out_file
            )));
        }

        if self.resolve_extensions.is_empty() {
            return Err(Error::Config(
                "at least one resolvable extension is required".to_string(),
            ));
        }

        for (i, rule) in self.module_rules.iter().enumerate() {
            let shadowed = rule.suffixes.iter().all(|suffix| {
                self.module_rules[..i]
                    .iter()
                    .any(|earlier| earlier.suffixes.contains(suffix) && earlier.exclude.is_empty())
            });
            if !rule.suffixes.is_empty() && shadowed {
                return Err(Error::Config(format!(
                    "module rule {} (stage '{}') is shadowed by an earlier rule",
                    i, rule.stage
                )));
            }
        }

        Ok(())
    }
}
