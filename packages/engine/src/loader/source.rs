// packages/engine/src/loader/source.rs
//! Default finder backed by registered module initializers

use crate::loader::module::Module;
use crate::loader::registry::{ModuleFinder, ModuleLoader, ModuleRegistry, ModuleSpec};
use crate::utils::errors::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Module body: populates the module, may import other modules
pub type ModuleInit = dyn Fn(&Module, &ModuleRegistry) -> Result<()> + Send + Sync;

/// A module known to the default finder
#[derive(Clone)]
pub struct ModuleSource {
    name: String,
    init: Arc<ModuleInit>,
}

impl ModuleSource {
    pub fn new<F>(name: impl Into<String>, init: F) -> Self
    where
        F: Fn(&Module, &ModuleRegistry) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            init: Arc::new(init),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSource").field("name", &self.name).finish()
    }
}

impl ModuleLoader for ModuleSource {
    fn exec_module(&self, module: &Module, registry: &ModuleRegistry) -> Result<()> {
        debug!("Executing module body for '{}'", self.name);
        (self.init)(module, registry)
    }
}

/// Resolves modules from registered sources
#[derive(Default)]
pub struct SourceFinder {
    sources: RwLock<HashMap<String, ModuleSource>>,
}

impl SourceFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, source: ModuleSource) -> Self {
        self.register(source);
        self
    }

    /// Register (or replace) a module source
    pub fn register(&self, source: ModuleSource) {
        self.sources.write().insert(source.name.clone(), source);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.read().contains_key(name)
    }
}

impl ModuleFinder for SourceFinder {
    fn name(&self) -> &str {
        "source"
    }

    fn find_spec(&self, name: &str, _registry: &ModuleRegistry) -> Result<Option<ModuleSpec>> {
        Ok(self
            .sources
            .read()
            .get(name)
            .map(|source| ModuleSpec::new(name, Arc::new(source.clone()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_finder_resolves_registered() {
        let finder = SourceFinder::new().with_source(ModuleSource::new("m", |_, _| Ok(())));
        let registry = ModuleRegistry::new(Arc::new(SourceFinder::new()));

        assert!(finder.contains("m"));
        assert!(finder.find_spec("m", &registry).unwrap().is_some());
        assert!(finder.find_spec("other", &registry).unwrap().is_none());
    }
}
