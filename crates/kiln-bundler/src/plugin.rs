//! Plugin infrastructure.
//!
//! Plugins are a homogeneous ordered sequence; the bundler iterates them in
//! registration order for each hook. A plugin opts into capabilities by
//! overriding the default no-op hooks:
//!
//! - `before_compile` - runs before graph construction; the wasm compile
//!   plugin invokes the external compiler here.
//! - `inject_assets` - registers virtual modules and queues extra output
//!   files; injected modules are resolved by the same walker machinery as
//!   disk modules.
//! - `transform_module` - a compile stage applied to files routed here by a
//!   module rule (e.g. the typed-entry stage).
//! - `transform_output` - last look at the assembled bundle before the
//!   atomic write.

use crate::config::ExecutionMode;
use crate::error::Result;
use kiln_graph::VirtualModules;
use std::path::{Path, PathBuf};

/// The compiled native module: binary payload plus generated loader glue.
///
/// Created once per build pass by the wasm compile plugin, owned by the pass
/// and discarded with it. Never mutated in place; a rebuild regenerates it.
#[derive(Debug, Clone)]
pub struct BinaryModuleArtifact {
    /// Crate/module name the artifact was derived from
    pub name: String,
    /// The wasm payload
    pub wasm: Vec<u8>,
    /// File name the payload is emitted under (async mode)
    pub wasm_file: String,
    /// Loader stub source, bundled like any other script module
    pub loader: String,
}

/// A file queued for emission alongside the bundle, written in the same
/// atomic batch.
#[derive(Debug, Clone)]
pub struct EmittedAsset {
    /// Path relative to the output directory
    pub rel_path: String,
    /// File content
    pub bytes: Vec<u8>,
}

/// The assembled bundle, handed to `transform_output` hooks before writing.
#[derive(Debug)]
pub struct Bundle {
    /// Bundle source text
    pub code: String,
}

/// Shared state for one build pass.
///
/// Constructed fresh per pass; nothing in here survives to the next one.
#[derive(Debug)]
pub struct BuildContext {
    /// Project root
    pub cwd: PathBuf,
    /// Resolved absolute output directory
    pub out_dir: PathBuf,
    /// Sync or async wasm loading
    pub execution_mode: ExecutionMode,
    /// Extra files to emit with the bundle
    pub assets: Vec<EmittedAsset>,
    /// The native artifact, once the wasm compile plugin has produced it
    pub artifact: Option<BinaryModuleArtifact>,
}

impl BuildContext {
    /// Create a context for a pass.
    pub fn new(cwd: PathBuf, out_dir: PathBuf, execution_mode: ExecutionMode) -> Self {
        Self {
            cwd,
            out_dir,
            execution_mode,
            assets: Vec::new(),
            artifact: None,
        }
    }

    /// Queue a file for emission in the pass's atomic batch.
    pub fn emit_asset(&mut self, rel_path: impl Into<String>, bytes: Vec<u8>) {
        self.assets.push(EmittedAsset {
            rel_path: rel_path.into(),
            bytes,
        });
    }
}

/// A pipeline stage. All hooks default to no-ops.
pub trait Plugin: Send + Sync {
    /// Stable name; module rules reference compile stages by this name.
    fn name(&self) -> &str;

    /// Runs before graph construction, in registration order.
    fn before_compile(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }

    /// Registers virtual modules and queues extra assets.
    fn inject_assets(&self, _ctx: &mut BuildContext, _virtuals: &mut VirtualModules) -> Result<()> {
        Ok(())
    }

    /// Compile stage: transform a module's source. Called only for files a
    /// module rule routes to this plugin.
    fn transform_module(&self, _path: &Path, source: &str) -> Result<String> {
        Ok(source.to_string())
    }

    /// Final hook over the assembled bundle.
    fn transform_output(&self, _ctx: &mut BuildContext, _bundle: &mut Bundle) -> Result<()> {
        Ok(())
    }
}

/// Ordered plugin collection. Registration order is execution order for
/// every hook.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Plugins in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    /// Look up a compile stage by name.
    pub fn stage(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .map(|p| p.as_ref())
            .find(|p| p.name() == name)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
