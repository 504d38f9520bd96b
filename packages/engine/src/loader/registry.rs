// packages/engine/src/loader/registry.rs
//! Module registry: finder chain and module cache

use crate::loader::module::Module;
use crate::utils::errors::{EngineError, Result};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Populates a module object
pub trait ModuleLoader: Send + Sync {
    fn exec_module(&self, module: &Module, registry: &ModuleRegistry) -> Result<()>;
}

/// How to load a module
#[derive(Clone)]
pub struct ModuleSpec {
    pub name: String,
    pub loader: Arc<dyn ModuleLoader>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            name: name.into(),
            loader,
        }
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSpec").field("name", &self.name).finish()
    }
}

/// One link of the resolution chain
pub trait ModuleFinder: Send + Sync {
    /// Name shown in logs and `finder_names`
    fn name(&self) -> &str;

    /// Produce a spec for `name`, or `None` to defer to the next finder
    fn find_spec(&self, name: &str, registry: &ModuleRegistry) -> Result<Option<ModuleSpec>>;
}

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(0);

/// Handle for removing an installed finder
///
/// Only valid for the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FinderId {
    registry: u64,
    seq: u64,
}

/// Finder chain plus module cache
///
/// Locks are never held while a finder or loader runs, so finders may
/// recursively call back into `find_spec` and module bodies may `import`.
pub struct ModuleRegistry {
    id: u64,
    finders: RwLock<Vec<(FinderId, Arc<dyn ModuleFinder>)>>,
    cache: RwLock<HashMap<String, Arc<Module>>>,
    next_seq: AtomicU64,
}

impl ModuleRegistry {
    /// Create a registry whose chain ends with `default_finder`
    pub fn new(default_finder: Arc<dyn ModuleFinder>) -> Self {
        let id = NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            finders: RwLock::new(vec![(FinderId { registry: id, seq: 0 }, default_finder)]),
            cache: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Whether `id` was issued by this registry
    pub fn issued(&self, id: FinderId) -> bool {
        id.registry == self.id
    }

    /// Install a finder at the front of the chain
    pub fn install_finder(&self, finder: Arc<dyn ModuleFinder>) -> FinderId {
        let id = FinderId {
            registry: self.id,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        info!("Installing module finder '{}' at front of chain", finder.name());
        self.finders.write().insert(0, (id, finder));
        id
    }

    /// Remove a previously installed finder
    pub fn remove_finder(&self, id: FinderId) -> bool {
        if !self.issued(id) {
            return false;
        }

        let mut finders = self.finders.write();
        match finders.iter().position(|(fid, _)| *fid == id) {
            Some(index) => {
                let (_, finder) = finders.remove(index);
                info!("Removed module finder '{}'", finder.name());
                true
            }
            None => false,
        }
    }

    /// Finder names, front of the chain first
    pub fn finder_names(&self) -> Vec<String> {
        self.finders
            .read()
            .iter()
            .map(|(_, finder)| finder.name().to_string())
            .collect()
    }

    /// Walk the finder chain; the first spec wins
    pub fn find_spec(&self, name: &str) -> Result<Option<ModuleSpec>> {
        let finders: Vec<Arc<dyn ModuleFinder>> = self
            .finders
            .read()
            .iter()
            .map(|(_, finder)| Arc::clone(finder))
            .collect();

        for finder in finders {
            if let Some(spec) = finder.find_spec(name, self)? {
                debug!("Finder '{}' resolved module '{}'", finder.name(), name);
                return Ok(Some(spec));
            }
        }

        Ok(None)
    }

    /// Import a module, executing it at most once per cache lifetime
    ///
    /// The module is cached before its loader runs, so an import of the same
    /// name from inside its own body sees the partially initialized module.
    /// A failing loader evicts the entry and its error is returned as is.
    /// When two first imports race, the first to reach the cache wins and
    /// the other returns that module without running its loader.
    pub fn import(&self, name: &str) -> Result<Arc<Module>> {
        if let Some(module) = self.get_cached(name) {
            return Ok(module);
        }

        let spec = self
            .find_spec(name)?
            .ok_or_else(|| EngineError::ModuleNotFound(name.to_string()))?;

        let module = Arc::new(Module::new(name));
        match self.cache.write().entry(name.to_string()) {
            Entry::Occupied(entry) => return Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&module));
            }
        }

        if let Err(e) = spec.loader.exec_module(&module, self) {
            let mut cache = self.cache.write();
            if cache.get(name).is_some_and(|m| Arc::ptr_eq(m, &module)) {
                cache.remove(name);
            }
            debug!("Import of '{}' failed: {}", name, e);
            return Err(e);
        }

        debug!("Imported module '{}' ({} exports)", name, module.len());
        Ok(module)
    }

    /// Execute a spec into a fresh module that is not cached
    pub fn load_detached(&self, spec: &ModuleSpec) -> Result<Arc<Module>> {
        let module = Arc::new(Module::new(spec.name.clone()));
        spec.loader.exec_module(&module, self)?;
        Ok(module)
    }

    pub fn get_cached(&self, name: &str) -> Option<Arc<Module>> {
        self.cache.read().get(name).cloned()
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.read().contains_key(name)
    }

    /// Drop a module from the cache so the next import resolves it again
    pub fn evict(&self, name: &str) -> bool {
        self.cache.write().remove(name).is_some()
    }
}
