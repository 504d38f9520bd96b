// packages/engine/src/object/value.rs
//! Dynamic values flowing through proxies

use crate::object::interceptable::{Interceptable, ObjectRef};
use crate::utils::errors::{EngineError, Result};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A value read from an attribute or returned by a call
#[derive(Clone)]
pub enum Value {
    /// Plain data with no attributes of its own
    Data(JsonValue),

    /// Shared reference to an object
    Object(ObjectRef),
}

impl Value {
    /// The null value
    pub fn none() -> Self {
        Value::Data(JsonValue::Null)
    }

    /// Wrap an object
    pub fn object<T: Interceptable + 'static>(obj: T) -> Self {
        Value::Object(Arc::new(obj))
    }

    /// Identity for objects, equality for data
    pub fn same(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Object(x), Value::Object(y)) => Arc::ptr_eq(x, y),
            (Value::Data(x), Value::Data(y)) => x == y,
            _ => false,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Object(obj) => obj.type_name(),
            Value::Data(JsonValue::Null) => "null",
            Value::Data(JsonValue::Bool(_)) => "bool",
            Value::Data(JsonValue::Number(_)) => "number",
            Value::Data(JsonValue::String(_)) => "str",
            Value::Data(JsonValue::Array(_)) => "list",
            Value::Data(JsonValue::Object(_)) => "dict",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Object(obj) if obj.is_callable())
    }

    /// Invoke the value
    pub fn call(&self, args: CallArgs) -> Result<Value> {
        match self {
            Value::Object(obj) => obj.call(args),
            Value::Data(_) => Err(EngineError::NotCallable(self.type_name().to_string())),
        }
    }

    /// Read an attribute
    pub fn get_attr(&self, name: &str) -> Result<Value> {
        match self {
            Value::Object(obj) => obj.get_attr(name),
            Value::Data(_) => Err(EngineError::attribute_not_found(self.type_name(), name)),
        }
    }

    /// Follow a dotted attribute chain, e.g. `chat.completions`
    pub fn get_path(&self, dotted: &str) -> Result<Value> {
        dotted
            .split('.')
            .try_fold(self.clone(), |value, name| value.get_attr(name))
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            Value::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&JsonValue> {
        match self {
            Value::Data(data) => Some(data),
            Value::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(JsonValue::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(JsonValue::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_data().and_then(JsonValue::as_bool)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::Data(JsonValue::Null))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Data(data) => write!(f, "Data({})", data),
            Value::Object(obj) => write!(f, "Object({:?})", obj),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(data: JsonValue) -> Self {
        Value::Data(data)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Data(JsonValue::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Data(JsonValue::String(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Data(JsonValue::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Data(JsonValue::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Data(JsonValue::Bool(b))
    }
}

/// Positional and keyword arguments for a call
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }

    /// Positional argument that must be present
    pub fn require_arg(&self, index: usize) -> Result<&Value> {
        self.arg(index).ok_or_else(|| {
            EngineError::InvalidArgument(format!("missing positional argument {}", index))
        })
    }

    /// Keyword argument that must be present
    pub fn require_kwarg(&self, name: &str) -> Result<&Value> {
        self.kwarg(name)
            .ok_or_else(|| EngineError::InvalidArgument(format!("missing keyword argument '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::native::{DynObject, NativeFn};
    use serde_json::json;

    #[test]
    fn test_identity() {
        let obj = Value::object(DynObject::new("Thing"));
        let alias = obj.clone();
        let other = Value::object(DynObject::new("Thing"));

        assert!(Value::same(&obj, &alias));
        assert!(!Value::same(&obj, &other));
        assert!(Value::same(&Value::from("a"), &Value::from("a")));
        assert!(!Value::same(&Value::from("a"), &obj));
    }

    #[test]
    fn test_data_has_no_attributes() {
        let data = Value::from(json!({"choices": []}));
        assert!(!data.is_callable());
        assert!(matches!(
            data.get_attr("choices"),
            Err(EngineError::AttributeNotFound { .. })
        ));
        assert!(matches!(data.call(CallArgs::new()), Err(EngineError::NotCallable(_))));
    }

    #[test]
    fn test_get_path() {
        let completions = DynObject::new("Completions")
            .with_attr("create", NativeFn::new("create", |_| Ok(Value::none())).into_value())
            .into_value();
        let chat = DynObject::new("Chat").with_attr("completions", completions).into_value();
        let client = DynObject::new("OpenAI").with_attr("chat", chat).into_value();

        let create = client.get_path("chat.completions.create").unwrap();
        assert!(create.is_callable());
        assert!(client.get_path("chat.missing").is_err());
    }

    #[test]
    fn test_call_args() {
        let args = CallArgs::new()
            .with_arg(1)
            .with_kwarg("model", "gpt-3.5-turbo");

        assert_eq!(args.arg(0).and_then(Value::as_i64), Some(1));
        assert_eq!(args.kwarg("model").and_then(Value::as_str), Some("gpt-3.5-turbo"));
        assert!(args.require_arg(1).is_err());
        assert!(args.require_kwarg("messages").is_err());
    }
}
