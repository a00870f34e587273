//! Conversion from the merged CLI configuration to bundler inputs.

use crate::config::KilnConfig;
use kiln_bundler::plugins::{AssetCopyPlugin, TypedEntryPlugin, WasmCompilePlugin};
use kiln_bundler::{BuildConfig, ModuleRule, Plugin};
use std::path::{Path, PathBuf};

impl KilnConfig {
    /// Project root as an absolute-ish path; relative roots are resolved by
    /// the bundler against the process working directory.
    pub fn project_root(&self) -> PathBuf {
        self.cwd.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Build the bundler configuration for one pass.
    pub fn to_build_config(&self, cwd: &Path) -> BuildConfig {
        let mut config = BuildConfig::new(self.entry.as_str())
            .cwd(cwd)
            .out_dir(self.out_dir.clone())
            .out_file(self.out_file.clone())
            .resolve_extensions(self.resolve_extensions.clone())
            .execution_mode(self.execution_mode);

        if let Some(typed) = &self.typed {
            config = config.module_rule(ModuleRule {
                suffixes: typed.suffixes.clone(),
                stage: "typed-entry".to_string(),
                exclude: typed.exclude.clone(),
            });
        }

        config
    }

    /// Instantiate the plugin set in pipeline order: wasm compile, typed
    /// entry stage, asset copy.
    pub fn build_plugins(&self) -> Vec<Box<dyn Plugin>> {
        let mut plugins: Vec<Box<dyn Plugin>> = Vec::new();

        if let Some(wasm) = &self.wasm {
            plugins.push(Box::new(
                WasmCompilePlugin::new(wasm.crate_dir.clone())
                    .compiler(wasm.command.clone(), wasm.args.clone())
                    .artifact_dir(wasm.artifact_dir.clone()),
            ));
        }

        if let Some(typed) = &self.typed {
            plugins.push(Box::new(TypedEntryPlugin::command(
                typed.command.clone(),
                typed.args.clone(),
            )));
        }

        if !self.assets.patterns.is_empty() {
            let plugin = if self.assets.strict {
                AssetCopyPlugin::strict(self.assets.patterns.clone())
            } else {
                AssetCopyPlugin::permissive(self.assets.patterns.clone())
            };
            plugins.push(Box::new(plugin));
        }

        plugins
    }
}
