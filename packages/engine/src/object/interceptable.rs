// packages/engine/src/object/interceptable.rs
//! The capability interface every proxied object satisfies

use crate::object::value::{CallArgs, Value};
use crate::utils::errors::{EngineError, Result};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an interceptable object
pub type ObjectRef = Arc<dyn Interceptable>;

/// Attribute and call access by name
///
/// Only `type_name`, `attr_names` and `get_attr` are required. Objects are
/// read-only and non-callable unless they say otherwise.
pub trait Interceptable: Send + Sync + fmt::Debug {
    /// Type name used in error messages and logs
    fn type_name(&self) -> &str;

    /// Names this object exports, in a stable order
    fn attr_names(&self) -> Vec<String>;

    /// Read an attribute
    fn get_attr(&self, name: &str) -> Result<Value>;

    /// Write an attribute
    fn set_attr(&self, name: &str, _value: Value) -> Result<()> {
        Err(EngineError::ReadOnlyAttribute {
            type_name: self.type_name().to_string(),
            name: name.to_string(),
        })
    }

    /// Whether `call` is supported
    fn is_callable(&self) -> bool {
        false
    }

    /// Invoke the object
    fn call(&self, _args: CallArgs) -> Result<Value> {
        Err(EngineError::NotCallable(self.type_name().to_string()))
    }
}
