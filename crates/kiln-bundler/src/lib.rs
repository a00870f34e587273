//! # kiln-bundler
//!
//! Bundler core for kiln: turns a wasm crate plus a thin JS/TS glue layer
//! into a single browser bundle.
//!
//! A build pass is a sequential pipeline: registered plugins run their
//! `before_compile` hooks (the wasm compile plugin shells out to the
//! external compiler here), then `inject_assets` hooks populate the virtual
//! module registry, then the graph walker resolves the entry point's
//! reference graph to a fixed point, module rules apply compile stages to
//! matching files, and emission writes the bundle plus side assets in one
//! atomic batch. Any failure aborts the pass before anything is written.
//!
//! ## Quick start
//!
//! ```no_run
//! use kiln_bundler::{BuildConfig, Bundler, ExecutionMode};
//! use kiln_bundler::plugins::{AssetCopyPlugin, WasmCompilePlugin};
//!
//! # fn main() -> kiln_bundler::Result<()> {
//! let config = BuildConfig::new("web/bootstrap.js")
//!     .out_dir("dist")
//!     .out_file("bootstrap.js")
//!     .execution_mode(ExecutionMode::AsyncWasm);
//!
//! let mut bundler = Bundler::new(config);
//! bundler.register(Box::new(AssetCopyPlugin::strict(["index.html"])));
//! bundler.register(Box::new(WasmCompilePlugin::new(".")));
//! let report = bundler.build()?;
//! println!("emitted {} files", report.files.len());
//! # Ok(()) }
//! ```

pub mod bundler;
pub mod config;
pub mod error;
pub mod output;
pub mod plugin;
pub mod plugins;
pub mod target;

pub use bundler::{BuildReport, Bundler};
pub use config::{BuildConfig, ExecutionMode, ModuleRule};
pub use error::{Diagnostic, Error, Result};
pub use plugin::{BinaryModuleArtifact, BuildContext, Bundle, EmittedAsset, Plugin};
pub use target::resolve_target;
