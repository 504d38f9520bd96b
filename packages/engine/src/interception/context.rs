// packages/engine/src/interception/context.rs
//! Interception context
//!
//! Owns one interception table and the resolver hook built from it. Create
//! it at startup, install it into the registry that bootstraps module
//! loading, and uninstall it when isolation is needed (e.g. between tests).
//!
//! Several contexts may be installed at once; the most recently installed
//! is consulted first. Modules already in the registry cache keep whatever
//! wrapping they were built with.

use crate::interception::finder::InterceptFinder;
use crate::interception::handlers::HandlerRegistry;
use crate::interception::table::InterceptionTable;
use crate::loader::{FinderId, ModuleRegistry};
use crate::utils::config::InterceptionConfig;
use crate::utils::errors::{EngineError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An activatable set of interceptions
pub struct InterceptionContext {
    table: Arc<InterceptionTable>,
    finder: Arc<InterceptFinder>,
    installed: Mutex<Option<FinderId>>,
}

impl InterceptionContext {
    pub fn new(table: InterceptionTable) -> Self {
        let table = Arc::new(table);
        let finder = Arc::new(InterceptFinder::new(Arc::clone(&table)));
        Self {
            table,
            finder,
            installed: Mutex::new(None),
        }
    }

    /// Build the table from configured `(path, handler name)` rules
    pub fn from_config(config: &InterceptionConfig, handlers: &HandlerRegistry) -> Result<Self> {
        let mut builder = InterceptionTable::builder();
        for rule in &config.rules {
            debug!("Configuring {} -> {}", rule.path, rule.handler);
            let handler = handlers.handler_for(&rule.handler, &rule.path)?;
            builder = builder.intercept_with(rule.path.clone(), handler);
        }
        Ok(Self::new(builder.build()))
    }

    pub fn table(&self) -> &Arc<InterceptionTable> {
        &self.table
    }

    pub fn finder(&self) -> &Arc<InterceptFinder> {
        &self.finder
    }

    /// Put the resolver hook at the front of `registry`'s finder chain
    ///
    /// Installing again into the same registry is a no-op returning the
    /// existing handle. A context is installed into one registry at a time;
    /// installing into another one fails until it is uninstalled.
    pub fn install(&self, registry: &ModuleRegistry) -> Result<FinderId> {
        let mut installed = self.installed.lock();
        if let Some(id) = *installed {
            if registry.issued(id) {
                return Ok(id);
            }
            return Err(EngineError::ConfigError(
                "Interception context is already installed in another registry".to_string(),
            ));
        }

        let id = registry.install_finder(self.finder.clone());
        info!(
            "Installed interception context ({} paths, modules: {})",
            self.table.len(),
            self.table.module_names().collect::<Vec<_>>().join(", ")
        );
        *installed = Some(id);
        Ok(id)
    }

    /// Remove the hook; cached modules are left untouched
    ///
    /// Returns `false` without changes if the context is not installed in
    /// `registry`.
    pub fn uninstall(&self, registry: &ModuleRegistry) -> bool {
        let mut installed = self.installed.lock();
        match *installed {
            Some(id) if registry.issued(id) => {
                *installed = None;
                registry.remove_finder(id)
            }
            Some(_) => {
                warn!("Ignoring uninstall from a registry this context is not installed in");
                false
            }
            None => false,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceFinder;
    use crate::utils::config::InterceptionRule;

    fn registry() -> ModuleRegistry {
        ModuleRegistry::new(Arc::new(SourceFinder::new()))
    }

    #[test]
    fn test_install_uninstall() {
        let registry = registry();
        let context = InterceptionContext::new(
            InterceptionTable::builder()
                .intercept("m:f()", |original, _| Ok(original))
                .build(),
        );

        assert!(!context.is_installed());
        let id = context.install(&registry).unwrap();
        assert_eq!(context.install(&registry).unwrap(), id);
        assert_eq!(registry.finder_names(), vec!["intercept[m]", "source"]);

        assert!(context.uninstall(&registry));
        assert!(!context.uninstall(&registry));
        assert_eq!(registry.finder_names(), vec!["source"]);
    }

    fn passthrough_context() -> InterceptionContext {
        InterceptionContext::new(
            InterceptionTable::builder()
                .intercept("m:f()", |original, _| Ok(original))
                .build(),
        )
    }

    #[test]
    fn test_uninstall_from_other_registry_is_refused() {
        let a = registry();
        let b = registry();
        let mine = passthrough_context();
        let other = passthrough_context();

        mine.install(&a).unwrap();
        other.install(&b).unwrap();

        assert!(!mine.uninstall(&b));
        assert!(mine.is_installed());
        assert_eq!(b.finder_names(), vec!["intercept[m]", "source"]);

        assert!(mine.uninstall(&a));
        assert_eq!(a.finder_names(), vec!["source"]);
        assert!(other.uninstall(&b));
        assert_eq!(b.finder_names(), vec!["source"]);
    }

    #[test]
    fn test_install_into_second_registry_fails() {
        let a = registry();
        let b = registry();
        let context = passthrough_context();

        context.install(&a).unwrap();
        let err = context.install(&b).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
        assert_eq!(b.finder_names(), vec!["source"]);

        assert!(context.uninstall(&a));
        context.install(&b).unwrap();
        assert_eq!(b.finder_names(), vec!["intercept[m]", "source"]);
    }

    #[test]
    fn test_from_config() {
        let config = InterceptionConfig {
            enabled: true,
            rules: vec![
                InterceptionRule {
                    path: "openai:OpenAI().chat.completions.create".to_string(),
                    handler: "log_completion".to_string(),
                },
                InterceptionRule {
                    path: "m:f()".to_string(),
                    handler: "passthrough".to_string(),
                },
            ],
        };

        let context = InterceptionContext::from_config(&config, &HandlerRegistry::with_builtins()).unwrap();
        assert_eq!(context.table().len(), 2);
        assert!(context.table().targets_module("openai"));
    }

    #[test]
    fn test_from_config_unknown_handler() {
        let config = InterceptionConfig {
            enabled: true,
            rules: vec![InterceptionRule {
                path: "m:f()".to_string(),
                handler: "nope".to_string(),
            }],
        };

        let result = InterceptionContext::from_config(&config, &HandlerRegistry::with_builtins());
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }
}
