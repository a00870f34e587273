//! Worklist-driven graph construction.
//!
//! The walker drains a queue of unresolved module ids, loading each module,
//! scanning its references, and enqueueing newly discovered ids until the
//! queue is empty. Plugin-injected virtual modules live in the
//! [`VirtualModules`] registry and are pulled through the same worklist, so
//! injected nodes that reference further injected nodes reach a fixed point
//! without special casing.

use crate::error::GraphError;
use crate::graph::BuildGraph;
use crate::module::{ModuleId, ModuleKind, ResolvedModule};
use crate::resolve::{resolve_specifier, VirtualEntry, VirtualModules};
use crate::scan::scan_references;
use std::collections::VecDeque;
use std::path::Path;

/// Supplies module source to the walker.
///
/// The bundler implements this to run compile stages (e.g. typed-entry
/// transformation) on source before it is scanned; plain builds use
/// [`FsLoader`]. The error type must absorb resolution errors so a single
/// error flows out of [`Walker::walk`].
pub trait SourceLoader {
    /// Loader error; resolution failures are converted into it.
    type Error: From<GraphError>;

    /// Load (and possibly transform) the module at `path`.
    fn load(&mut self, path: &Path) -> Result<String, Self::Error>;

    /// Transform source that did not come from disk. Plugin-injected script
    /// modules are routed through here so they get the same treatment as
    /// on-disk files. The default passes the source through unchanged.
    fn transform(&mut self, path: &Path, source: String) -> Result<String, Self::Error> {
        let _ = path;
        Ok(source)
    }
}

/// Loader that reads source straight from disk.
pub struct FsLoader;

impl SourceLoader for FsLoader {
    type Error = GraphError;

    fn load(&mut self, path: &Path) -> Result<String, GraphError> {
        let bytes = std::fs::read(path).map_err(|source| GraphError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|_| GraphError::InvalidUtf8(path.to_path_buf()))
    }
}

/// Builds a [`BuildGraph`] from an entry point.
pub struct Walker<'a> {
    extensions: &'a [String],
    virtuals: &'a VirtualModules,
}

impl<'a> Walker<'a> {
    /// Create a walker over the given extension order and virtual registry.
    pub fn new(extensions: &'a [String], virtuals: &'a VirtualModules) -> Self {
        Self {
            extensions,
            virtuals,
        }
    }

    /// Walk the reference graph rooted at `entry` to a fixed point.
    ///
    /// Fails fast on the first unresolved reference or load failure; the
    /// partially built graph is dropped with the error.
    pub fn walk<L: SourceLoader>(
        &self,
        entry: &Path,
        loader: &mut L,
    ) -> Result<BuildGraph, L::Error> {
        if !entry.is_file() && !self.virtuals.contains(entry) {
            return Err(GraphError::EntryNotFound(entry.to_path_buf()).into());
        }

        let entry_id = ModuleId::new(entry);
        let mut graph = BuildGraph::new(entry_id.clone());
        let mut queue: VecDeque<ModuleId> = VecDeque::from([entry_id]);

        while let Some(id) = queue.pop_front() {
            if graph.contains(&id) {
                continue;
            }

            let mut module = self.load_module(&id, loader)?;

            if module.kind == ModuleKind::Script {
                for spec in scan_references(&module.source) {
                    let target =
                        resolve_specifier(&spec, id.path(), self.extensions, self.virtuals)?;
                    if !graph.contains(&target) {
                        queue.push_back(target.clone());
                    }
                    module.references.push((spec, target));
                }
            }

            graph.insert(module);
        }

        Ok(graph)
    }

    fn load_module<L: SourceLoader>(
        &self,
        id: &ModuleId,
        loader: &mut L,
    ) -> Result<ResolvedModule, L::Error> {
        if let Some(entry) = self.virtuals.get(id.path()) {
            let (kind, source) = match entry {
                VirtualEntry::Script(source) => {
                    let source = loader.transform(id.path(), source.clone())?;
                    (ModuleKind::Script, source)
                }
                VirtualEntry::Binary(_) => (ModuleKind::Binary, String::new()),
            };
            return Ok(ResolvedModule {
                id: id.clone(),
                kind,
                source,
                references: Vec::new(),
                virtual_module: true,
            });
        }

        let source = loader.load(id.path())?;
        Ok(ResolvedModule::script(id.clone(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec![".js".to_string()]
    }

    #[test]
    fn test_walk_single_module() {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("main.js");
        fs::write(&entry, "console.log(1);").unwrap();

        let virtuals = VirtualModules::new();
        let graph = Walker::new(&exts(), &virtuals)
            .walk(&entry, &mut FsLoader)
            .unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_walk_transitive_references() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.js"),
            r#"import { a } from "./a.js";"#,
        )
        .unwrap();
        fs::write(dir.path().join("a.js"), r#"import { b } from "./b.js";"#).unwrap();
        fs::write(dir.path().join("b.js"), "export const b = 1;").unwrap();

        let virtuals = VirtualModules::new();
        let graph = Walker::new(&exts(), &virtuals)
            .walk(&dir.path().join("main.js"), &mut FsLoader)
            .unwrap();
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_walk_shared_dependency_once() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.js"),
            r#"
            import "./a.js";
            import "./b.js";
            "#,
        )
        .unwrap();
        fs::write(dir.path().join("a.js"), r#"import "./shared.js";"#).unwrap();
        fs::write(dir.path().join("b.js"), r#"import "./shared.js";"#).unwrap();
        fs::write(dir.path().join("shared.js"), "").unwrap();

        let virtuals = VirtualModules::new();
        let graph = Walker::new(&exts(), &virtuals)
            .walk(&dir.path().join("main.js"), &mut FsLoader)
            .unwrap();
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_walk_virtual_chain_reaches_fixed_point() {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("main.js");
        fs::write(&entry, r#"import init from "./pkg/loader.js";"#).unwrap();

        // loader.js is virtual and itself references a virtual binary.
        let mut virtuals = VirtualModules::new();
        virtuals.insert_script(
            dir.path().join("pkg/loader.js"),
            r#"import "./core.wasm";"#.to_string(),
        );
        virtuals.insert_binary(dir.path().join("pkg/core.wasm"), vec![0, 0x61, 0x73, 0x6d]);

        let exts = vec![".js".to_string(), ".wasm".to_string()];
        let graph = Walker::new(&exts, &virtuals)
            .walk(&entry, &mut FsLoader)
            .unwrap();

        assert_eq!(graph.len(), 3);
        let binary = graph
            .get(&ModuleId::new(dir.path().join("pkg/core.wasm")))
            .unwrap();
        assert_eq!(binary.kind, ModuleKind::Binary);
        assert!(binary.virtual_module);
    }

    /// Loader whose transform stamps every module it sees, virtual or not.
    struct StampingLoader;

    impl SourceLoader for StampingLoader {
        type Error = GraphError;

        fn load(&mut self, path: &Path) -> Result<String, GraphError> {
            let source = FsLoader.load(path)?;
            self.transform(path, source)
        }

        fn transform(&mut self, _path: &Path, source: String) -> Result<String, GraphError> {
            Ok(format!("/* staged */\n{source}"))
        }
    }

    #[test]
    fn test_walk_transforms_virtual_scripts() {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("main.js");
        fs::write(&entry, r#"import "./gen.js";"#).unwrap();

        let mut virtuals = VirtualModules::new();
        virtuals.insert_script(dir.path().join("gen.js"), "export const g = 1;".to_string());

        let graph = Walker::new(&exts(), &virtuals)
            .walk(&entry, &mut StampingLoader)
            .unwrap();

        let injected = graph
            .get(&ModuleId::new(dir.path().join("gen.js")))
            .unwrap();
        assert!(injected.virtual_module);
        assert!(injected.source.starts_with("/* staged */"));
    }

    #[test]
    fn test_walk_missing_entry() {
        let dir = TempDir::new().unwrap();
        let virtuals = VirtualModules::new();
        let err = Walker::new(&exts(), &virtuals)
            .walk(&dir.path().join("nope.js"), &mut FsLoader)
            .unwrap_err();
        assert!(matches!(err, GraphError::EntryNotFound(_)));
    }

    #[test]
    fn test_walk_unresolved_reference() {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("main.js");
        fs::write(&entry, r#"import "./ghost.js";"#).unwrap();

        let virtuals = VirtualModules::new();
        let err = Walker::new(&exts(), &virtuals)
            .walk(&entry, &mut FsLoader)
            .unwrap_err();
        match err {
            GraphError::UnresolvedReference { specifier, .. } => {
                assert_eq!(specifier, "./ghost.js")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
