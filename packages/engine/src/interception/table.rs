// packages/engine/src/interception/table.rs
//! Interception table mapping capability paths to handlers
//!
//! Built once, never mutated afterwards. Keys are kept in a `BTreeMap` so
//! prefix relevance is a single ordered range probe instead of a scan.

use crate::interception::path::{is_well_formed, module_name_of};
use crate::object::Value;
use crate::utils::errors::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;
use tracing::{debug, warn};

/// Instrumentation handler: `(original, owner) -> replacement`
///
/// The handler decides whether the original ever runs; the engine does not
/// call it on the handler's behalf.
pub type Handler = Arc<dyn Fn(Value, Value) -> Result<Value> + Send + Sync>;

/// Immutable capability path → handler mapping
#[derive(Clone, Default)]
pub struct InterceptionTable {
    handlers: BTreeMap<String, Handler>,
    modules: BTreeSet<String>,
}

impl InterceptionTable {
    pub fn builder() -> InterceptionTableBuilder {
        InterceptionTableBuilder::default()
    }

    /// Handler registered at exactly `path`
    pub fn handler(&self, path: &str) -> Option<&Handler> {
        self.handlers.get(path)
    }

    pub fn is_registered(&self, path: &str) -> bool {
        self.handlers.contains_key(path)
    }

    /// True if `path` equals a key or some key starts with it
    pub fn is_relevant(&self, path: &str) -> bool {
        // Keys sharing a prefix are contiguous and start at the prefix itself.
        self.handlers
            .range::<str, _>((Bound::Included(path), Bound::Unbounded))
            .next()
            .is_some_and(|(key, _)| key.starts_with(path))
    }

    /// Module names targeted by at least one key
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn targets_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for InterceptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionTable")
            .field("paths", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FromIterator<(String, Handler)> for InterceptionTable {
    fn from_iter<I: IntoIterator<Item = (String, Handler)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(InterceptionTableBuilder::default(), |builder, (path, handler)| {
                builder.intercept_with(path, handler)
            })
            .build()
    }
}

/// Collects `(path, handler)` pairs into an [`InterceptionTable`]
///
/// Path syntax is not validated. A key that can never be produced by walking
/// a module is logged and kept; it simply never matches.
#[derive(Default)]
pub struct InterceptionTableBuilder {
    handlers: BTreeMap<String, Handler>,
}

impl InterceptionTableBuilder {
    /// Register a closure at `path`
    pub fn intercept<F>(self, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.intercept_with(path, Arc::new(handler))
    }

    /// Register a shared handler at `path`; a later registration replaces
    /// an earlier one for the same path
    pub fn intercept_with(mut self, path: impl Into<String>, handler: Handler) -> Self {
        let path = path.into();
        if !is_well_formed(&path) {
            warn!("Capability path '{}' is malformed and will never match", path);
        }
        self.handlers.insert(path, handler);
        self
    }

    pub fn build(self) -> InterceptionTable {
        let modules = self
            .handlers
            .keys()
            .map(|key| module_name_of(key).to_string())
            .collect();

        let table = InterceptionTable {
            handlers: self.handlers,
            modules,
        };
        debug!("Built interception table: {:?}", table);
        table
    }
}
