//! Merged-configuration validation.
//!
//! Checks the fields the bundler itself cannot see (watch tuning, typed
//! stage shape). Entry existence, output naming, and rule shadowing are
//! validated again by the bundler at the start of each pass.

use crate::config::KilnConfig;
use crate::error::{ConfigError, Result};

impl KilnConfig {
    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<()> {
        if self.entry.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "entry".to_string(),
                value: self.entry.clone(),
                hint: "Set 'entry' in kiln.config.json or pass it as an argument".to_string(),
            }
            .into());
        }

        if self.resolve_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "resolve_extensions".to_string(),
                value: "[]".to_string(),
                hint: "At least one extension is required, e.g. [\".js\", \".wasm\"]".to_string(),
            }
            .into());
        }

        if let Some(typed) = &self.typed {
            if typed.command.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "typed.command".to_string(),
                    value: typed.command.clone(),
                    hint: "Name the compiler executable the typed stage should invoke".to_string(),
                }
                .into());
            }
            if typed.suffixes.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "typed.suffixes".to_string(),
                    value: "[]".to_string(),
                    hint: "List the suffixes to route through the stage, e.g. [\".ts\"]"
                        .to_string(),
                }
                .into());
            }
        }

        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "watch.debounce_ms".to_string(),
                value: "0".to_string(),
                hint: "Use a positive debounce window; 200 is the default".to_string(),
            }
            .into());
        }

        if self.watch.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "watch.poll_interval_ms".to_string(),
                value: "0".to_string(),
                hint: "Use a positive poll interval; 200 is the default".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
