//! Command-line interface definition for Kiln.
//!
//! The complete CLI structure via clap v4 derive macros.
//!
//! # Command Structure
//!
//! - `kiln build` - Compile the wasm crate and bundle the glue layer
//! - `kiln build --watch` - Same, then rebuild on file changes
//! - `kiln check` - Load and validate configuration without building

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, ModeArg};

/// Kiln - a wasm-aware web bundle orchestrator
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Build wasm-backed web bundles",
    long_about = "Kiln compiles a Rust-to-WebAssembly crate, bundles its JavaScript or\n\
                  TypeScript glue layer, and copies static assets into a single output\n\
                  directory - with an optional watch mode that rebuilds on change."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows per-stage detail: compiler invocations, module resolution, and
    /// emitted files.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
