//! Bundle assembly.
//!
//! Wraps every graph module in a registry function keyed by its project-root
//! relative path and prepends a small loader runtime. Binary modules are
//! materialized per execution mode: async emits the payload as a separate
//! `.wasm` file and exports its URL; sync inlines the payload as base64 so
//! the bundle is self-contained and instantiation can happen at load time.

use crate::config::ExecutionMode;
use crate::error::{Error, Result};
use crate::output::rewrite::rewrite_module;
use crate::plugin::EmittedAsset;
use base64::Engine;
use kiln_graph::{BuildGraph, ModuleKind, VirtualModules};
use std::collections::HashMap;
use std::path::Path;

/// Assemble the bundle source and any binary side assets.
pub fn assemble(
    graph: &BuildGraph,
    virtuals: &VirtualModules,
    cwd: &Path,
    mode: ExecutionMode,
) -> Result<(String, Vec<EmittedAsset>)> {
    let mut side_assets = Vec::new();
    let mut registry = String::new();

    for module in graph.modules() {
        let key = module.id.relative_to(cwd);
        let body = match module.kind {
            ModuleKind::Script => {
                let keys: HashMap<String, String> = module
                    .references
                    .iter()
                    .map(|(spec, target)| (spec.clone(), target.relative_to(cwd)))
                    .collect();
                rewrite_module(&module.source, &keys)
            }
            ModuleKind::Binary => {
                let bytes = binary_bytes(module.id.path(), virtuals)?;
                let file_name = module
                    .id
                    .path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "module.wasm".to_string());
                match mode {
                    ExecutionMode::AsyncWasm => {
                        side_assets.push(EmittedAsset {
                            rel_path: file_name.clone(),
                            bytes: bytes.to_vec(),
                        });
                        format!("exports.url = \"./{file_name}\";")
                    }
                    ExecutionMode::Sync => {
                        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                        format!("exports.bytes = __kiln_b64__(\"{encoded}\");")
                    }
                }
            }
        };

        registry.push_str(&format!(
            "\"{key}\": function (module, exports, __kiln_require__) {{\n{body}\n}},\n"
        ));
    }

    let entry_key = graph.entry().relative_to(cwd);
    let b64_helper = match mode {
        ExecutionMode::Sync => B64_HELPER,
        ExecutionMode::AsyncWasm => "",
    };

    let code = format!(
        "(function () {{\n\
         \"use strict\";\n\
         var __kiln_modules__ = {{\n{registry}}};\n\
         var __kiln_cache__ = Object.create(null);\n\
         function __kiln_require__(id) {{\n\
         \tvar cached = __kiln_cache__[id];\n\
         \tif (cached) return cached.exports;\n\
         \tvar module = {{ exports: {{}} }};\n\
         \t__kiln_cache__[id] = module;\n\
         \t__kiln_modules__[id](module, module.exports, __kiln_require__);\n\
         \treturn module.exports;\n\
         }}\n\
         {b64_helper}\
         __kiln_require__(\"{entry_key}\");\n\
         }})();\n"
    );

    Ok((code, side_assets))
}

/// Decoder injected only for sync execution mode, where the wasm payload is
/// inlined.
const B64_HELPER: &str = "function __kiln_b64__(s) {\n\
    \tvar bin = atob(s);\n\
    \tvar bytes = new Uint8Array(bin.length);\n\
    \tfor (var i = 0; i < bin.length; i++) bytes[i] = bin.charCodeAt(i);\n\
    \treturn bytes;\n\
    }\n";

fn binary_bytes<'a>(path: &Path, virtuals: &'a VirtualModules) -> Result<&'a [u8]> {
    virtuals
        .binary_bytes(path)
        .ok_or_else(|| Error::WriteFailure(format!("no payload for binary module {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_graph::{FsLoader, Walker};
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec![".js".to_string(), ".wasm".to_string()]
    }

    fn wasm_graph(dir: &Path) -> (BuildGraph, VirtualModules) {
        fs::write(
            dir.join("main.js"),
            r#"import init from "./pkg/demo.js";
init();
"#,
        )
        .unwrap();

        let mut virtuals = VirtualModules::new();
        virtuals.insert_script(
            dir.join("pkg/demo.js"),
            r#"import * as w from "./demo_bg.wasm";
export default function init() { return w; }
"#
            .to_string(),
        );
        virtuals.insert_binary(dir.join("pkg/demo_bg.wasm"), b"\0asm\x01\0\0\0".to_vec());

        let graph = Walker::new(&exts(), &virtuals)
            .walk(&dir.join("main.js"), &mut FsLoader)
            .unwrap();
        (graph, virtuals)
    }

    #[test]
    fn test_assemble_async_emits_wasm_side_asset() {
        let dir = TempDir::new().unwrap();
        let (graph, virtuals) = wasm_graph(dir.path());

        let (code, assets) =
            assemble(&graph, &virtuals, dir.path(), ExecutionMode::AsyncWasm).unwrap();

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].rel_path, "demo_bg.wasm");
        assert_eq!(assets[0].bytes, b"\0asm\x01\0\0\0");
        assert!(code.contains("exports.url = \"./demo_bg.wasm\";"));
        assert!(!code.contains("__kiln_b64__"));
    }

    #[test]
    fn test_assemble_sync_inlines_wasm() {
        let dir = TempDir::new().unwrap();
        let (graph, virtuals) = wasm_graph(dir.path());

        let (code, assets) = assemble(&graph, &virtuals, dir.path(), ExecutionMode::Sync).unwrap();

        assert!(assets.is_empty());
        assert!(code.contains("exports.bytes = __kiln_b64__("));
        assert!(code.contains("function __kiln_b64__"));
        // Payload is recoverable from the inlined base64.
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"\0asm\x01\0\0\0");
        assert!(code.contains(&encoded));
    }

    #[test]
    fn test_assemble_entry_is_required_last() {
        let dir = TempDir::new().unwrap();
        let (graph, virtuals) = wasm_graph(dir.path());

        let (code, _) =
            assemble(&graph, &virtuals, dir.path(), ExecutionMode::AsyncWasm).unwrap();
        assert!(code.trim_end().ends_with("__kiln_require__(\"main.js\");\n})();"));
    }

    #[test]
    fn test_assemble_rewrites_references_to_keys() {
        let dir = TempDir::new().unwrap();
        let (graph, virtuals) = wasm_graph(dir.path());

        let (code, _) =
            assemble(&graph, &virtuals, dir.path(), ExecutionMode::AsyncWasm).unwrap();
        assert!(code.contains("__kiln_require__(\"pkg/demo.js\")"));
        assert!(code.contains("__kiln_require__(\"pkg/demo_bg.wasm\")"));
        // No untouched import statements survive.
        assert!(!code.contains("import init"));
    }

    #[test]
    fn test_assemble_deterministic_for_same_input() {
        let dir = TempDir::new().unwrap();
        let (graph, virtuals) = wasm_graph(dir.path());

        let (a, _) = assemble(&graph, &virtuals, dir.path(), ExecutionMode::AsyncWasm).unwrap();
        let (b, _) = assemble(&graph, &virtuals, dir.path(), ExecutionMode::AsyncWasm).unwrap();
        assert_eq!(a, b);
    }
}
