// packages/engine/src/object/native.rs
//! Adapters for exposing Rust code as interceptable objects

use crate::object::interceptable::Interceptable;
use crate::object::value::{CallArgs, Value};
use crate::utils::errors::{EngineError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Boxed call body shared by [`NativeFn`] and [`NativeClass`]
pub type NativeCallable = dyn Fn(CallArgs) -> Result<Value> + Send + Sync;

/// A named native function
#[derive(Clone)]
pub struct NativeFn {
    name: String,
    func: Arc<NativeCallable>,
}

impl NativeFn {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(CallArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

impl Interceptable for NativeFn {
    fn type_name(&self) -> &str {
        "function"
    }

    fn attr_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn get_attr(&self, name: &str) -> Result<Value> {
        Err(EngineError::attribute_not_found(self.type_name(), name))
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        (self.func)(args)
    }
}

/// A mutable bag of named attributes
pub struct DynObject {
    type_name: String,
    attrs: RwLock<BTreeMap<String, Value>>,
}

impl DynObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_attr(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.write().insert(name.into(), value.into());
        self
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object>", self.type_name)
    }
}

impl Interceptable for DynObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attr_names(&self) -> Vec<String> {
        self.attrs.read().keys().cloned().collect()
    }

    fn get_attr(&self, name: &str) -> Result<Value> {
        self.attrs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::attribute_not_found(&self.type_name, name))
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<()> {
        self.attrs.write().insert(name.to_string(), value);
        Ok(())
    }
}

/// A callable constructor that also carries static attributes
pub struct NativeClass {
    name: String,
    ctor: Arc<NativeCallable>,
    attrs: RwLock<BTreeMap<String, Value>>,
}

impl NativeClass {
    pub fn new<F>(name: impl Into<String>, ctor: F) -> Self
    where
        F: Fn(CallArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ctor: Arc::new(ctor),
            attrs: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_attr(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.write().insert(name.into(), value.into());
        self
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl fmt::Debug for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Interceptable for NativeClass {
    fn type_name(&self) -> &str {
        "type"
    }

    fn attr_names(&self) -> Vec<String> {
        self.attrs.read().keys().cloned().collect()
    }

    fn get_attr(&self, name: &str) -> Result<Value> {
        self.attrs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::attribute_not_found(&self.name, name))
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<()> {
        self.attrs.write().insert(name.to_string(), value);
        Ok(())
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        (self.ctor)(args)
    }
}
