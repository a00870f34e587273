//! The transient build graph.

use crate::module::{ModuleId, ResolvedModule};
use std::collections::HashMap;

/// Directed graph of resolved modules rooted at the entry point.
///
/// Constructed at the start of a build pass, consumed by emission, and
/// discarded when the pass ends. Insertion order is preserved so bundle
/// output is deterministic for identical inputs.
#[derive(Debug)]
pub struct BuildGraph {
    entry: ModuleId,
    order: Vec<ModuleId>,
    modules: HashMap<ModuleId, ResolvedModule>,
}

impl BuildGraph {
    /// Create a graph rooted at `entry`. The entry module itself is added by
    /// the walker like any other module.
    pub fn new(entry: ModuleId) -> Self {
        Self {
            entry,
            order: Vec::new(),
            modules: HashMap::new(),
        }
    }

    /// The root module id.
    pub fn entry(&self) -> &ModuleId {
        &self.entry
    }

    /// Insert a resolved module. Later insertions with the same id are
    /// ignored; the walker visits each id at most once.
    pub fn insert(&mut self, module: ResolvedModule) {
        if !self.modules.contains_key(&module.id) {
            self.order.push(module.id.clone());
            self.modules.insert(module.id.clone(), module);
        }
    }

    /// Whether `id` is already in the graph.
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    /// Look up a module by id.
    pub fn get(&self, id: &ModuleId) -> Option<&ResolvedModule> {
        self.modules.get(id)
    }

    /// Modules in insertion order (entry first).
    pub fn modules(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.order.iter().filter_map(|id| self.modules.get(id))
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph holds no modules.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
