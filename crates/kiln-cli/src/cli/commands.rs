use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Available Kiln subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project
    ///
    /// Compiles the wasm crate, runs the typed entry stage if configured,
    /// bundles the glue layer, and copies static assets. With `--watch`,
    /// stays running and rebuilds when source files change.
    Build(BuildArgs),

    /// Validate configuration without building
    ///
    /// Loads kiln.config.json (plus environment and CLI overrides), runs the
    /// same validation a build would, and reports the result.
    Check(CheckArgs),
}

/// How the emitted bundle loads the wasm payload.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Inline the payload and instantiate synchronously at load time
    Sync,
    /// Emit a separate .wasm file and instantiate behind an init promise
    AsyncWasm,
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Glue-layer entry point
    ///
    /// Overrides the `entry` field of kiln.config.json. Relative paths
    /// resolve against the project root.
    #[arg(value_name = "ENTRY")]
    pub entry: Option<String>,

    /// Path to the configuration file
    ///
    /// Defaults to kiln.config.json in the project root, used only if it
    /// exists.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory for the bundle and assets
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Bundle file name within the output directory
    #[arg(long, value_name = "NAME")]
    pub out_file: Option<String>,

    /// Wasm execution mode
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Project root directory
    ///
    /// All relative paths (entry, output, asset patterns) resolve against
    /// this. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Rebuild automatically when source files change
    ///
    /// Runs an initial build, then watches the project root. Change bursts
    /// within the debounce window coalesce into a single rebuild; a failed
    /// rebuild keeps the previous output and the watcher alive.
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Use mtime polling instead of native file notifications
    ///
    /// Slower but works on filesystems without change notification support
    /// (network mounts, some containers).
    #[arg(long, requires = "watch")]
    pub poll: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Path to the configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}
