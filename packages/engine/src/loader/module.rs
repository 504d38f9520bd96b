// packages/engine/src/loader/module.rs
//! Module objects

use crate::object::{Interceptable, Value};
use crate::utils::errors::{EngineError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;

/// A loaded module: a name plus its exported attributes
pub struct Module {
    name: String,
    attrs: RwLock<BTreeMap<String, Value>>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Install an export
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.write().insert(name.into(), value.into());
    }

    /// Look up an export
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    /// Exported names, sorted
    pub fn exports(&self) -> Vec<String> {
        self.attrs.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.attrs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.read().is_empty()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<module '{}'>", self.name)
    }
}

impl Interceptable for Module {
    fn type_name(&self) -> &str {
        "module"
    }

    fn attr_names(&self) -> Vec<String> {
        self.exports()
    }

    fn get_attr(&self, name: &str) -> Result<Value> {
        self.get(name).ok_or_else(|| {
            EngineError::attribute_not_found(format!("module {}", self.name), name)
        })
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<()> {
        self.set(name, value);
        Ok(())
    }
}
