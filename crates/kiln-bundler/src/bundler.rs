//! The build pass orchestrator.
//!
//! One [`Bundler::build`] call is one pass: validate, run plugin hooks,
//! walk the graph, assemble, write atomically. Passes share nothing with
//! each other except the on-disk output target.

use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::output::{assemble, write_atomic};
use crate::plugin::{BuildContext, Bundle, Plugin, PluginRegistry};
use crate::target::resolve_target;
use kiln_graph::{FsLoader, SourceLoader, VirtualModules, Walker};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Summary of a successful pass.
#[derive(Debug)]
pub struct BuildReport {
    /// Resolved output directory
    pub out_dir: PathBuf,
    /// Emitted files: output-relative path and size in bytes
    pub files: Vec<(String, usize)>,
    /// Number of modules in the graph
    pub module_count: usize,
}

/// Executes build passes for one configuration.
pub struct Bundler {
    config: BuildConfig,
    plugins: PluginRegistry,
}

impl Bundler {
    /// Create a bundler with no plugins registered.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            plugins: PluginRegistry::new(),
        }
    }

    /// Register a plugin. Registration order is hook execution order.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.register(plugin);
    }

    /// The configuration this bundler was built with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run one complete build pass.
    ///
    /// Fails fast: the first stage error aborts the pass and nothing is
    /// written. On success the bundle, the binary artifact (async mode), and
    /// all propagated assets land in the output directory in a single
    /// atomic batch.
    pub fn build(&self) -> Result<BuildReport> {
        self.config.validate()?;

        let cwd = resolve_target(&self.config.cwd, &[] as &[&Path])?;
        let out_dir = if self.config.out_dir.is_absolute() {
            resolve_target(&self.config.out_dir, &[] as &[&Path])?
        } else {
            resolve_target(&cwd, &[self.config.out_dir.as_path()])?
        };
        let entry = if self.config.entry.is_absolute() {
            self.config.entry.clone()
        } else {
            cwd.join(&self.config.entry)
        };

        let mut ctx = BuildContext::new(cwd.clone(), out_dir.clone(), self.config.execution_mode);

        // Hooks run in registration order; the wasm compile plugin blocks
        // here until its sub-process exits.
        for plugin in self.plugins.iter() {
            debug!("before_compile: {}", plugin.name());
            plugin.before_compile(&mut ctx)?;
        }

        let mut virtuals = VirtualModules::new();
        for plugin in self.plugins.iter() {
            debug!("inject_assets: {}", plugin.name());
            plugin.inject_assets(&mut ctx, &mut virtuals)?;
        }

        // Graph construction drains a worklist until no unresolved
        // references remain, injected virtual modules included.
        let mut loader = StageLoader {
            config: &self.config,
            plugins: &self.plugins,
        };
        let graph = Walker::new(&self.config.resolve_extensions, &virtuals)
            .walk(&entry, &mut loader)?;
        info!("resolved {} modules", graph.len());

        let (code, side_assets) = assemble(&graph, &virtuals, &cwd, self.config.execution_mode)?;
        let mut bundle = Bundle { code };
        ctx.assets.extend(side_assets);

        for plugin in self.plugins.iter() {
            plugin.transform_output(&mut ctx, &mut bundle)?;
        }

        let mut files: Vec<(String, Vec<u8>)> =
            vec![(self.config.out_file.clone(), bundle.code.into_bytes())];
        for asset in ctx.assets {
            files.push((asset.rel_path, asset.bytes));
        }

        let borrowed: Vec<(String, &[u8])> = files
            .iter()
            .map(|(path, bytes)| (path.clone(), bytes.as_slice()))
            .collect();
        write_atomic(&out_dir, &borrowed)?;

        Ok(BuildReport {
            out_dir,
            files: files
                .into_iter()
                .map(|(path, bytes)| (path, bytes.len()))
                .collect(),
            module_count: graph.len(),
        })
    }
}

/// Loader that routes module source through the compile stage its first
/// matching rule names. Files matching no rule pass through unmodified.
/// Plugin-injected modules get the same rule matching as on-disk files.
struct StageLoader<'a> {
    config: &'a BuildConfig,
    plugins: &'a PluginRegistry,
}

impl SourceLoader for StageLoader<'_> {
    type Error = Error;

    fn load(&mut self, path: &Path) -> Result<String> {
        let source = FsLoader.load(path)?;
        self.transform(path, source)
    }

    fn transform(&mut self, path: &Path, source: String) -> Result<String> {
        let Some(rule) = self.config.rule_for(path) else {
            return Ok(source);
        };
        let Some(stage) = self.plugins.stage(&rule.stage) else {
            return Err(Error::Config(format!(
                "module rule names unknown compile stage '{}'",
                rule.stage
            )));
        };
        debug!("stage '{}': {}", rule.stage, path.display());
        stage.transform_module(path, &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExecutionMode, ModuleRule};
    use crate::error::Diagnostic;
    use kiln_graph::GraphError;
    use std::fs;
    use tempfile::TempDir;

    /// Plugin standing in for the wasm stage: injects a loader and binary
    /// without spawning a compiler.
    struct FakeWasm {
        root: PathBuf,
    }

    impl Plugin for FakeWasm {
        fn name(&self) -> &str {
            "wasm-compile"
        }

        fn inject_assets(
            &self,
            _ctx: &mut BuildContext,
            virtuals: &mut VirtualModules,
        ) -> Result<()> {
            virtuals.insert_script(
                self.root.join("pkg/demo.js"),
                "import * as w from \"./demo_bg.wasm\";\nexport default function init() { return w; }\n"
                    .to_string(),
            );
            virtuals.insert_binary(self.root.join("pkg/demo_bg.wasm"), b"\0asm".to_vec());
            Ok(())
        }
    }

    /// Compile stage that fails any file containing a planted marker.
    struct FailingStage;

    impl Plugin for FailingStage {
        fn name(&self) -> &str {
            "typed-entry"
        }

        fn transform_module(&self, path: &Path, source: &str) -> Result<String> {
            if source.contains("@type-error") {
                return Err(Error::TypeCheck {
                    diagnostics: vec![Diagnostic {
                        file: path.to_path_buf(),
                        message: "planted".to_string(),
                    }],
                });
            }
            Ok(source.replace(": number", ""))
        }
    }

    fn project(dir: &Path) -> BuildConfig {
        fs::write(
            dir.join("main.js"),
            "import init from \"./pkg/demo.js\";\ninit();\n",
        )
        .unwrap();
        BuildConfig::new("main.js").cwd(dir)
    }

    #[test]
    fn test_build_emits_bundle_and_artifact() {
        let dir = TempDir::new().unwrap();
        let config = project(dir.path());
        let mut bundler = Bundler::new(config);
        bundler.register(Box::new(FakeWasm {
            root: dir.path().to_path_buf(),
        }));

        let report = bundler.build().unwrap();
        assert_eq!(report.module_count, 3);
        assert!(dir.path().join("dist/bundle.js").is_file());
        assert!(dir.path().join("dist/demo_bg.wasm").is_file());
    }

    #[test]
    fn test_build_absolute_out_dir() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(dir.path().join("main.js"), "console.log(1);\n").unwrap();

        let config = BuildConfig::new("main.js")
            .cwd(dir.path())
            .out_dir(out.path());
        let report = Bundler::new(config).build().unwrap();

        assert!(out.path().join("bundle.js").is_file());
        assert!(!dir.path().join("dist").exists());
        assert!(report.out_dir.is_absolute());
    }

    #[test]
    fn test_build_sync_mode_has_no_wasm_file() {
        let dir = TempDir::new().unwrap();
        let config = project(dir.path()).execution_mode(ExecutionMode::Sync);
        let mut bundler = Bundler::new(config);
        bundler.register(Box::new(FakeWasm {
            root: dir.path().to_path_buf(),
        }));

        bundler.build().unwrap();
        assert!(dir.path().join("dist/bundle.js").is_file());
        assert!(!dir.path().join("dist/demo_bg.wasm").exists());
        let code = fs::read_to_string(dir.path().join("dist/bundle.js")).unwrap();
        assert!(code.contains("__kiln_b64__"));
    }

    #[test]
    fn test_unresolved_reference_fails_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.js"), "import \"./ghost.js\";\n").unwrap();
        let bundler = Bundler::new(BuildConfig::new("main.js").cwd(dir.path()));

        let err = bundler.build().unwrap_err();
        match err {
            Error::Graph(GraphError::UnresolvedReference { specifier, .. }) => {
                assert_eq!(specifier, "./ghost.js");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("dist").exists());
    }

    #[test]
    fn test_module_rule_routes_through_stage() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.js"),
            "import { n } from \"./typed.ts\";\n",
        )
        .unwrap();
        fs::write(dir.path().join("typed.ts"), "export const n: number = 1;\n").unwrap();

        let config = BuildConfig::new("main.js").cwd(dir.path()).module_rule(ModuleRule {
            suffixes: vec![".ts".to_string()],
            stage: "typed-entry".to_string(),
            exclude: vec!["node_modules".to_string()],
        });
        let mut bundler = Bundler::new(config);
        bundler.register(Box::new(FailingStage));

        bundler.build().unwrap();
        let code = fs::read_to_string(dir.path().join("dist/bundle.js")).unwrap();
        assert!(!code.contains(": number"));
    }

    /// Plugin injecting a typed virtual module, so rule matching on
    /// injected nodes can be observed end to end.
    struct TypedInjector {
        root: PathBuf,
    }

    impl Plugin for TypedInjector {
        fn name(&self) -> &str {
            "typed-injector"
        }

        fn inject_assets(
            &self,
            _ctx: &mut BuildContext,
            virtuals: &mut VirtualModules,
        ) -> Result<()> {
            virtuals.insert_script(
                self.root.join("gen/glue.ts"),
                "export const n: number = 1;\n".to_string(),
            );
            Ok(())
        }
    }

    #[test]
    fn test_injected_module_routes_through_stage() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.js"),
            "import { n } from \"./gen/glue.ts\";\n",
        )
        .unwrap();

        let config = BuildConfig::new("main.js").cwd(dir.path()).module_rule(ModuleRule {
            suffixes: vec![".ts".to_string()],
            stage: "typed-entry".to_string(),
            exclude: vec![],
        });
        let mut bundler = Bundler::new(config);
        bundler.register(Box::new(TypedInjector {
            root: dir.path().to_path_buf(),
        }));
        bundler.register(Box::new(FailingStage));

        bundler.build().unwrap();
        let code = fs::read_to_string(dir.path().join("dist/bundle.js")).unwrap();
        assert!(!code.contains(": number"));
    }

    #[test]
    fn test_type_error_fails_pass_and_keeps_old_bundle() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.js"),
            "import { n } from \"./typed.ts\";\n",
        )
        .unwrap();
        fs::write(dir.path().join("typed.ts"), "export const n: number = 1;\n").unwrap();

        let config = BuildConfig::new("main.js").cwd(dir.path()).module_rule(ModuleRule {
            suffixes: vec![".ts".to_string()],
            stage: "typed-entry".to_string(),
            exclude: vec![],
        });
        let mut bundler = Bundler::new(config);
        bundler.register(Box::new(FailingStage));

        // First pass succeeds.
        bundler.build().unwrap();
        let before = fs::read(dir.path().join("dist/bundle.js")).unwrap();

        // Introduce a type error; the pass fails and the bundle is untouched.
        fs::write(
            dir.path().join("typed.ts"),
            "// @type-error\nexport const n: number = 1;\n",
        )
        .unwrap();
        let err = bundler.build().unwrap_err();
        assert!(matches!(err, Error::TypeCheck { .. }));
        let after = fs::read(dir.path().join("dist/bundle.js")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_repeat_build_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = project(dir.path());
        let mut bundler = Bundler::new(config);
        bundler.register(Box::new(FakeWasm {
            root: dir.path().to_path_buf(),
        }));

        bundler.build().unwrap();
        let first = fs::read(dir.path().join("dist/bundle.js")).unwrap();
        bundler.build().unwrap();
        let second = fs::read(dir.path().join("dist/bundle.js")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_stage_is_config_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.ts"), "export const x = 1;\n").unwrap();
        let config = BuildConfig::new("main.ts").cwd(dir.path()).module_rule(ModuleRule {
            suffixes: vec![".ts".to_string()],
            stage: "nonexistent".to_string(),
            exclude: vec![],
        });
        let bundler = Bundler::new(config);
        let err = bundler.build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
