//! Error handling for the Kiln CLI.
//!
//! A `thiserror` hierarchy with hint-bearing messages: top-level [`CliError`]
//! wraps the domain errors ([`ConfigError`], the bundler's own taxonomy) and
//! is converted to a `miette` report at the very top of `main`.

use kiln_bundler::Error as BundlerError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors from the bundler pipeline (compile, resolve, emit)
    #[error(transparent)]
    Bundler(#[from] BundlerError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
///
/// Each variant carries guidance on what went wrong and how to fix it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file was requested explicitly but doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a kiln.config.json file or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Config file or merged configuration failed to parse
    #[error("Invalid configuration: {0}\n\nHint: Check kiln.config.json syntax and field types")]
    Invalid(String),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with the invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Replace a not-found I/O error with a path-bearing error.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error with a context message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

/// Convert a [`CliError`] to a miette report for terminal rendering.
///
/// Bundler errors get their multi-diagnostic detail expanded; everything
/// else renders its Display form, which already carries the hints.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Bundler(e @ BundlerError::TypeCheck { .. }) => {
            miette::miette!("{}\n{}", e, e.detail())
        }
        CliError::Bundler(e) => miette::miette!("{}", e),
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found_has_hint() {
        let err = ConfigError::NotFound(PathBuf::from("kiln.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("kiln.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let config_err = ConfigError::Invalid("bad json".to_string());
        let cli_err: CliError = config_err.into();
        assert!(matches!(cli_err, CliError::Config(_)));
    }

    #[test]
    fn test_cli_error_from_bundler_error() {
        let bundler_err = BundlerError::AssetNotFound {
            pattern: "*.css".to_string(),
        };
        let cli_err: CliError = bundler_err.into();
        assert!(matches!(cli_err, CliError::Bundler(_)));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let err = result.with_path("/test/path.txt").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::Invalid("boom".to_string()));
        let err = result.with_hint("Try the other thing").unwrap_err();
        assert!(err.to_string().contains("Hint: Try the other thing"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::Invalid("boom".to_string()));
        let err = result.context("Failed to load").unwrap_err();
        assert!(err.to_string().contains("Failed to load"));
    }

    #[test]
    fn test_miette_report_renders_hint() {
        let err = CliError::Config(ConfigError::NotFound(PathBuf::from("kiln.config.json")));
        let report = cli_error_to_miette(err);
        assert!(format!("{report}").contains("Hint"));
    }
}
