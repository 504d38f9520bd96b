// packages/engine/src/interception/proxy_loader.rs
//! Loader that builds an intercepted module from the real one

use crate::interception::path::CapabilityPath;
use crate::interception::proxy;
use crate::interception::table::InterceptionTable;
use crate::loader::{Module, ModuleLoader, ModuleRegistry, ModuleSpec};
use crate::object::{Interceptable, ObjectRef, Value};
use crate::observability::MODULES_INTERCEPTED;
use crate::utils::errors::Result;
use std::sync::Arc;
use tracing::info;

/// Populates the output module with proxied exports of the real module
///
/// The real module body runs exactly once, into a detached module object;
/// copying its exports afterwards is a pure read pass.
pub struct ProxyLoader {
    real_spec: ModuleSpec,
    base: CapabilityPath,
    table: Arc<InterceptionTable>,
}

impl ProxyLoader {
    pub fn new(real_spec: ModuleSpec, base: CapabilityPath, table: Arc<InterceptionTable>) -> Self {
        Self {
            real_spec,
            base,
            table,
        }
    }

    pub fn base(&self) -> &CapabilityPath {
        &self.base
    }
}

impl ModuleLoader for ProxyLoader {
    fn exec_module(&self, module: &Module, registry: &ModuleRegistry) -> Result<()> {
        let real = registry.load_detached(&self.real_spec)?;
        let real_ref: ObjectRef = real.clone();
        let owner = Value::Object(real_ref);

        let exports = real.exports();
        for name in &exports {
            let attr = real.get_attr(name)?;
            let built = proxy::build(attr, &self.base.attr(name), &owner, &self.table)?;
            module.set(name.clone(), built);
        }

        metrics::counter!(MODULES_INTERCEPTED).increment(1);
        info!(
            "Intercepted module '{}' ({} exports)",
            module.name(),
            exports.len()
        );
        Ok(())
    }
}
