//! Wasm compile plugin.
//!
//! Shells out to an external native-to-wasm compiler (`wasm-pack` by
//! convention) against a crate directory, blocks the pass until it exits,
//! and injects the resulting artifact into the build graph: a virtual loader
//! stub at `<crate>/pkg/<name>.js` and a virtual binary at
//! `<crate>/pkg/<name>_bg.wasm`. The glue layer's import of the loader path
//! is satisfied before that path exists on disk.
//!
//! There is no incremental caching: the compiler is re-invoked in full on
//! every pass, and the artifact is regenerated rather than mutated.

use crate::error::{Error, Result};
use crate::plugin::{BinaryModuleArtifact, BuildContext, Plugin};
use kiln_graph::VirtualModules;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Pipeline stage wrapping the external wasm compiler.
pub struct WasmCompilePlugin {
    /// Crate directory handed to the compiler
    source_dir: PathBuf,
    /// Compiler executable
    command: String,
    /// Arguments before the crate directory
    args: Vec<String>,
    /// Artifact directory relative to the crate, `pkg` by convention
    artifact_dir: String,
}

impl WasmCompilePlugin {
    /// Create a plugin for the crate at `source_dir` using the conventional
    /// `wasm-pack build --target web` invocation.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            command: "wasm-pack".to_string(),
            args: vec![
                "build".to_string(),
                "--target".to_string(),
                "web".to_string(),
            ],
            artifact_dir: "pkg".to_string(),
        }
    }

    /// Override the compiler executable and its leading arguments.
    pub fn compiler(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.command = command.into();
        self.args = args;
        self
    }

    /// Override the artifact directory name (relative to the crate).
    pub fn artifact_dir(mut self, dir: impl Into<String>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    /// Invoke the external compiler and read back the artifact.
    ///
    /// Blocks until the sub-process exits; this is the only suspension point
    /// in a pass besides file I/O. A non-zero exit becomes
    /// [`Error::NativeCompile`] carrying the sub-process's stderr verbatim.
    pub fn compile(&self, ctx: &BuildContext) -> Result<BinaryModuleArtifact> {
        let crate_dir = if self.source_dir.is_absolute() {
            self.source_dir.clone()
        } else {
            ctx.cwd.join(&self.source_dir)
        };

        info!(
            "compiling native module: {} {} {}",
            self.command,
            self.args.join(" "),
            crate_dir.display()
        );

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(&crate_dir)
            .output()
            .map_err(|e| Error::NativeCompile {
                status: "failed to spawn".to_string(),
                stderr: format!("{}: {e}", self.command),
            })?;

        if !output.status.success() {
            return Err(Error::NativeCompile {
                status: output
                    .status
                    .code()
                    .map(|c| format!("exit code {c}"))
                    .unwrap_or_else(|| "terminated by signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let pkg_dir = crate_dir.join(&self.artifact_dir);
        let wasm_path = find_wasm_artifact(&pkg_dir)?;
        let wasm = std::fs::read(&wasm_path)?;

        let name = wasm_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "module".to_string())
            .trim_end_matches("_bg")
            .to_string();
        let wasm_file = format!("{name}_bg.wasm");

        debug!(
            "native artifact: {} ({} bytes)",
            wasm_path.display(),
            wasm.len()
        );

        Ok(BinaryModuleArtifact {
            loader: loader_stub(&name, &wasm_file),
            name,
            wasm,
            wasm_file,
        })
    }

    fn loader_path(&self, ctx: &BuildContext, name: &str) -> PathBuf {
        let crate_dir = if self.source_dir.is_absolute() {
            self.source_dir.clone()
        } else {
            ctx.cwd.join(&self.source_dir)
        };
        crate_dir.join(&self.artifact_dir).join(format!("{name}.js"))
    }
}

impl Plugin for WasmCompilePlugin {
    fn name(&self) -> &str {
        "wasm-compile"
    }

    fn before_compile(&self, ctx: &mut BuildContext) -> Result<()> {
        let artifact = self.compile(ctx)?;
        ctx.artifact = Some(artifact);
        Ok(())
    }

    fn inject_assets(&self, ctx: &mut BuildContext, virtuals: &mut VirtualModules) -> Result<()> {
        let Some(artifact) = ctx.artifact.as_ref() else {
            return Err(Error::Config(
                "wasm compile stage ran out of order: no artifact available".to_string(),
            ));
        };

        let loader_path = self.loader_path(ctx, &artifact.name);
        let binary_path = loader_path.with_file_name(&artifact.wasm_file);

        virtuals.insert_script(&loader_path, artifact.loader.clone());
        virtuals.insert_binary(&binary_path, artifact.wasm.clone());
        Ok(())
    }
}

/// Find the single `.wasm` file in the compiler's conventional output
/// location.
fn find_wasm_artifact(pkg_dir: &Path) -> Result<PathBuf> {
    let entries =
        std::fs::read_dir(pkg_dir).map_err(|_| Error::ArtifactMissing(pkg_dir.to_path_buf()))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "wasm") {
            return Ok(path);
        }
    }
    Err(Error::ArtifactMissing(pkg_dir.to_path_buf()))
}

/// Generate the loader stub bundled alongside the binary module.
///
/// The stub performs the runtime's instantiation protocol. In async mode the
/// binary module exports the artifact's URL and the default export is an
/// init function resolving after instantiation; in sync mode the binary
/// module exports the raw bytes and instantiation happens at load time. The
/// same stub serves both: it branches on which export the binary module
/// provides.
fn loader_stub(name: &str, wasm_file: &str) -> String {
    format!(
        r#"import * as __wasm_module__ from "./{wasm_file}";

let wasm = null;

export default async function init(input) {{
    if (wasm !== null) return wasm;
    if (__wasm_module__.bytes !== undefined) {{
        const module = new WebAssembly.Module(__wasm_module__.bytes);
        wasm = new WebAssembly.Instance(module, {{}}).exports;
        return wasm;
    }}
    if (input === undefined) input = __wasm_module__.url;
    const response = await fetch(input);
    const buffer = await response.arrayBuffer();
    const result = await WebAssembly.instantiate(buffer, {{}});
    wasm = result.instance.exports;
    return wasm;
}}

export function exports_of_{name}() {{
    return wasm;
}}
"#
    )
}
