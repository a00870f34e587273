use crate::cli::{BuildArgs, ModeArg};
use crate::config::KilnConfig;
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use kiln_bundler::ExecutionMode;
use std::path::Path;

impl KilnConfig {
    /// Load configuration from file and environment.
    /// Priority: environment variables > config file > defaults. CLI flags
    /// are applied on top via [`KilnConfig::apply_build_args`].
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // An explicit --config path must exist; the default kiln.config.json
        // is used only if present.
        let config_file = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()).into());
                }
                Some(path.to_path_buf())
            }
            None => {
                let default_path = Path::new("kiln.config.json");
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        // Environment overrides (KILN_ENTRY, KILN_OUT_DIR, ...)
        figment = figment.merge(Env::prefixed("KILN_"));

        figment
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()).into())
    }

    /// Apply command-line overrides on top of the merged configuration.
    pub fn apply_build_args(&mut self, args: &BuildArgs) {
        if let Some(entry) = &args.entry {
            self.entry = entry.clone();
        }
        if let Some(out_dir) = &args.out_dir {
            self.out_dir = out_dir.clone();
        }
        if let Some(out_file) = &args.out_file {
            self.out_file = out_file.clone();
        }
        if let Some(mode) = args.mode {
            self.execution_mode = match mode {
                ModeArg::Sync => ExecutionMode::Sync,
                ModeArg::AsyncWasm => ExecutionMode::AsyncWasm,
            };
        }
        if let Some(cwd) = &args.cwd {
            self.cwd = Some(cwd.clone());
        }
    }
}
