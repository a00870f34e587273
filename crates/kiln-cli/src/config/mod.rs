//! Configuration loading and validation for the Kiln CLI.
//!
//! Configuration is layered via figment: defaults < `kiln.config.json` <
//! `KILN_*` environment variables < command-line flags. The merged result is
//! converted into the bundler's [`kiln_bundler::BuildConfig`] plus the
//! plugin set for the pass.

mod conversions;
mod loading;
mod types;
mod validation;

pub use types::{AssetsConfig, KilnConfig, TypedConfig, WasmConfig, WatchConfig};
