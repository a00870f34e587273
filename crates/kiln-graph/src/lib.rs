//! # kiln-graph
//!
//! Build graph foundation for the kiln bundler.
//!
//! This crate owns the transient module graph that a single build pass
//! constructs: module identities, static reference scanning, extension-based
//! specifier resolution, and the worklist walker that grows the graph from an
//! entry point until every reachable reference is resolved.
//!
//! The graph is deliberately short-lived. Each build pass constructs a fresh
//! [`BuildGraph`], consumes it during emission, and drops it. Nothing here
//! persists between passes.
//!
//! ## Quick start
//!
//! ```no_run
//! use kiln_graph::{Walker, FsLoader, VirtualModules};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), kiln_graph::GraphError> {
//! let extensions = vec![".js".to_string(), ".mjs".to_string()];
//! let virtuals = VirtualModules::new();
//! let mut loader = FsLoader;
//! let graph = Walker::new(&extensions, &virtuals)
//!     .walk(Path::new("src/bootstrap.js"), &mut loader)?;
//! for module in graph.modules() {
//!     println!("{}", module.id);
//! }
//! # Ok(()) }
//! ```

mod error;
mod graph;
mod module;
mod resolve;
mod scan;
mod walker;

pub use error::GraphError;
pub use graph::BuildGraph;
pub use module::{ModuleId, ModuleKind, ResolvedModule};
pub use resolve::{resolve_specifier, VirtualModules};
pub use scan::scan_references;
pub use walker::{FsLoader, SourceLoader, Walker};
