//! Kiln CLI library.
//!
//! Exposes the CLI building blocks (argument parsing, configuration loading,
//! command execution, watch loop, terminal UI) so integration tests and the
//! binary share one implementation.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;
pub mod watch;
