//! Built-in plugins.
//!
//! - [`WasmCompilePlugin`] - invokes the external wasm compiler and injects
//!   the binary artifact plus loader stub into the graph.
//! - [`AssetCopyPlugin`] - propagates static files verbatim into the output
//!   directory.
//! - [`TypedEntryPlugin`] - type-checks and transpiles typed glue source via
//!   an external compiler.

mod asset_copy;
mod typed_entry;
mod wasm_compile;

pub use asset_copy::AssetCopyPlugin;
pub use typed_entry::{CommandTypedCompiler, TypedCompileFailure, TypedCompiler, TypedEntryPlugin};
pub use wasm_compile::WasmCompilePlugin;
