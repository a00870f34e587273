//! Configuration types mirroring kiln.config.json.

use kiln_bundler::ExecutionMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration, merged from defaults, file, environment, and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    /// Glue-layer entry point, relative to the project root
    pub entry: String,
    /// Output directory
    pub out_dir: PathBuf,
    /// Bundle file name within the output directory
    pub out_file: String,
    /// Ordered extension list tried during reference resolution
    pub resolve_extensions: Vec<String>,
    /// Sync or async wasm loading
    pub execution_mode: ExecutionMode,
    /// Project root; `None` means the process working directory
    pub cwd: Option<PathBuf>,
    /// Static asset propagation
    pub assets: AssetsConfig,
    /// Native module compilation
    pub wasm: Option<WasmConfig>,
    /// Typed entry compile stage
    pub typed: Option<TypedConfig>,
    /// Watch mode tuning
    pub watch: WatchConfig,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            entry: "src/index.js".to_string(),
            out_dir: PathBuf::from("dist"),
            out_file: "bundle.js".to_string(),
            resolve_extensions: vec![
                ".js".to_string(),
                ".mjs".to_string(),
                ".ts".to_string(),
                ".wasm".to_string(),
            ],
            execution_mode: ExecutionMode::default(),
            cwd: None,
            assets: AssetsConfig::default(),
            wasm: None,
            typed: None,
            watch: WatchConfig::default(),
        }
    }
}

/// Static asset propagation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Glob patterns resolved against the project root
    pub patterns: Vec<String>,
    /// Fail the pass when a pattern matches nothing
    pub strict: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            strict: true,
        }
    }
}

/// Native module compilation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WasmConfig {
    /// Crate directory handed to the compiler, relative to the project root
    pub crate_dir: PathBuf,
    /// Compiler executable
    pub command: String,
    /// Arguments placed before the crate directory
    pub args: Vec<String>,
    /// Artifact directory name within the crate
    pub artifact_dir: String,
}

impl Default for WasmConfig {
    fn default() -> Self {
        Self {
            crate_dir: PathBuf::from("."),
            command: "wasm-pack".to_string(),
            args: vec![
                "build".to_string(),
                "--target".to_string(),
                "web".to_string(),
            ],
            artifact_dir: "pkg".to_string(),
        }
    }
}

/// Typed entry compile stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypedConfig {
    /// Compiler executable, invoked once per matching file
    pub command: String,
    /// Arguments placed before the file path
    pub args: Vec<String>,
    /// File suffixes routed through the stage
    pub suffixes: Vec<String>,
    /// Path substrings that opt a file out
    pub exclude: Vec<String>,
}

impl Default for TypedConfig {
    fn default() -> Self {
        Self {
            command: "tsc-transpile".to_string(),
            args: Vec::new(),
            suffixes: vec![".ts".to_string()],
            exclude: vec!["node_modules".to_string()],
        }
    }
}

/// Watch mode tuning. Defaults match the conventional aggregate/poll
/// windows for web build watchers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet window after the last change before a rebuild starts
    pub debounce_ms: u64,
    /// Snapshot interval for the polling fallback
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            poll_interval_ms: 200,
        }
    }
}
