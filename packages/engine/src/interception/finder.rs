// packages/engine/src/interception/finder.rs
//! Resolver hook
//!
//! Sits at the front of the finder chain and gets first refusal on every
//! import. For a targeted module it resolves the real spec through the rest
//! of the chain and hands back a [`ProxyLoader`] in its place.

use crate::interception::guard::ReentrancyGuard;
use crate::interception::path::CapabilityPath;
use crate::interception::proxy_loader::ProxyLoader;
use crate::interception::table::InterceptionTable;
use crate::loader::{ModuleFinder, ModuleRegistry, ModuleSpec};
use crate::utils::errors::Result;
use std::sync::Arc;
use tracing::debug;

/// Finder producing proxy loaders for targeted modules
pub struct InterceptFinder {
    name: String,
    table: Arc<InterceptionTable>,
    guard: ReentrancyGuard,
}

impl InterceptFinder {
    pub fn new(table: Arc<InterceptionTable>) -> Self {
        let modules: Vec<&str> = table.module_names().collect();
        let name = format!("intercept[{}]", modules.join(","));
        Self {
            name,
            table,
            guard: ReentrancyGuard::new(),
        }
    }

    pub fn table(&self) -> &Arc<InterceptionTable> {
        &self.table
    }

    /// Targeted by a key and not already being resolved by this finder
    pub fn should_intercept(&self, module_name: &str) -> bool {
        self.table.targets_module(module_name) && !self.guard.contains(module_name)
    }

    /// Resolve `module_name` to a proxy spec, or `None` to defer
    ///
    /// When the real module cannot be found this also returns `None`, so the
    /// registry reports the same error it would without interception.
    pub fn resolve(&self, module_name: &str, registry: &ModuleRegistry) -> Result<Option<ModuleSpec>> {
        if !self.table.targets_module(module_name) {
            return Ok(None);
        }

        let Some(token) = self.guard.enter(module_name) else {
            debug!("'{}' already in flight, deferring", module_name);
            return Ok(None);
        };
        let real_spec = registry.find_spec(module_name);
        drop(token);

        let Some(real_spec) = real_spec? else {
            debug!("No real module behind '{}', deferring", module_name);
            return Ok(None);
        };

        debug!("Intercepting import of '{}'", module_name);
        let loader = ProxyLoader::new(
            real_spec,
            CapabilityPath::root(module_name),
            Arc::clone(&self.table),
        );
        Ok(Some(ModuleSpec::new(module_name, Arc::new(loader))))
    }
}

impl ModuleFinder for InterceptFinder {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_spec(&self, name: &str, registry: &ModuleRegistry) -> Result<Option<ModuleSpec>> {
        self.resolve(name, registry)
    }
}
