// packages/engine/src/interception/proxy.rs
//! Proxy nodes
//!
//! `build` decides, per attribute or call result, whether a value stays on
//! a path that can still reach a registered handler. Irrelevant values are
//! returned bare and never examined again; relevant ones are wrapped so the
//! next hop can make its own decision.
//!
//! ```text
//! build(value, path)
//!   callable  → path() registered?  → handler(value, owner)
//!               path() relevant?    → CallableProxy(path())
//!               otherwise           → value
//!   object    → path relevant?      → AttributeProxy(path)
//!               otherwise           → value
//!   data      → value
//! ```

use crate::interception::path::CapabilityPath;
use crate::interception::table::{Handler, InterceptionTable};
use crate::object::{CallArgs, Interceptable, ObjectRef, Value};
use crate::observability::{HANDLER_INVOCATIONS, PROXIES_BUILT};
use crate::utils::errors::Result;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Wrap `value` reached at `path` if it can still lead to a handler
pub fn build(
    value: Value,
    path: &CapabilityPath,
    owner: &Value,
    table: &Arc<InterceptionTable>,
) -> Result<Value> {
    let obj = match &value {
        Value::Object(obj) => Arc::clone(obj),
        Value::Data(_) => return Ok(value),
    };

    if obj.is_callable() {
        let call_path = path.call();

        if let Some(handler) = table.handler(call_path.as_str()) {
            return invoke(handler, &call_path, value, owner.clone());
        }

        if !table.is_relevant(call_path.as_str()) {
            trace!("Passing through {}", call_path);
            return Ok(value);
        }

        debug!("Wrapping callable at {}", call_path);
        metrics::counter!(PROXIES_BUILT).increment(1);
        return Ok(Value::object(CallableProxy {
            inner: obj,
            call_path,
            owner: owner.clone(),
            table: Arc::clone(table),
        }));
    }

    if !table.is_relevant(path.as_str()) {
        trace!("Passing through {}", path);
        return Ok(value);
    }

    debug!("Wrapping attributes at {}", path);
    metrics::counter!(PROXIES_BUILT).increment(1);
    Ok(Value::object(AttributeProxy {
        inner: obj,
        path: path.clone(),
        table: Arc::clone(table),
    }))
}

fn invoke(handler: &Handler, path: &CapabilityPath, original: Value, owner: Value) -> Result<Value> {
    debug!("Invoking handler for {}", path);
    metrics::counter!(HANDLER_INVOCATIONS).increment(1);
    handler(original, owner)
}

/// Wraps a callable; the call result is re-examined under `path()`
pub struct CallableProxy {
    inner: ObjectRef,
    call_path: CapabilityPath,
    owner: Value,
    table: Arc<InterceptionTable>,
}

impl CallableProxy {
    pub fn call_path(&self) -> &CapabilityPath {
        &self.call_path
    }

    pub fn inner(&self) -> &ObjectRef {
        &self.inner
    }
}

impl fmt::Debug for CallableProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<callable proxy {} of {:?}>", self.call_path, self.inner)
    }
}

impl Interceptable for CallableProxy {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn attr_names(&self) -> Vec<String> {
        self.inner.attr_names()
    }

    // Attributes of the callable itself are not on any capability path.
    fn get_attr(&self, name: &str) -> Result<Value> {
        self.inner.get_attr(name)
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<()> {
        self.inner.set_attr(name, value)
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        let result = self.inner.call(args)?;
        build(result, &self.call_path, &self.owner, &self.table)
    }
}

/// Wraps a non-callable object; each attribute read is matched at `path.name`
pub struct AttributeProxy {
    inner: ObjectRef,
    path: CapabilityPath,
    table: Arc<InterceptionTable>,
}

impl AttributeProxy {
    pub fn path(&self) -> &CapabilityPath {
        &self.path
    }

    pub fn inner(&self) -> &ObjectRef {
        &self.inner
    }
}

impl fmt::Debug for AttributeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<attribute proxy {} of {:?}>", self.path, self.inner)
    }
}

impl Interceptable for AttributeProxy {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn attr_names(&self) -> Vec<String> {
        self.inner.attr_names()
    }

    fn get_attr(&self, name: &str) -> Result<Value> {
        let attr = self.inner.get_attr(name)?;
        let path = self.path.attr(name);
        let owner = Value::Object(Arc::clone(&self.inner));

        if let Some(handler) = self.table.handler(path.as_str()) {
            return invoke(handler, &path, attr, owner);
        }

        build(attr, &path, &owner, &self.table)
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<()> {
        self.inner.set_attr(name, value)
    }

    fn is_callable(&self) -> bool {
        false
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        self.inner.call(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{DynObject, NativeFn};
    use crate::utils::errors::EngineError;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table(entries: Vec<(&str, Handler)>) -> Arc<InterceptionTable> {
        Arc::new(
            entries
                .into_iter()
                .map(|(path, handler)| (path.to_string(), handler))
                .collect(),
        )
    }

    fn recording_handler(seen: Arc<Mutex<Vec<(Value, Value)>>>) -> Handler {
        Arc::new(move |original: Value, owner: Value| -> Result<Value> {
            seen.lock().push((original.clone(), owner));
            Ok(original)
        })
    }

    #[test]
    fn test_data_passes_through() {
        let table = table(vec![("m:x", recording_handler(Default::default()))]);
        let value = Value::from("plain");
        let built = build(value.clone(), &"m:x".into(), &Value::none(), &table).unwrap();
        assert!(Value::same(&built, &value));
    }

    #[test]
    fn test_irrelevant_object_is_identity() {
        let table = table(vec![("m:client.send()", recording_handler(Default::default()))]);
        let value = DynObject::new("Other").into_value();

        let built = build(value.clone(), &"m:other".into(), &Value::none(), &table).unwrap();
        assert!(Value::same(&built, &value));

        let func = NativeFn::new("f", |_| Ok(Value::none())).into_value();
        let built = build(func.clone(), &"m:f".into(), &Value::none(), &table).unwrap();
        assert!(Value::same(&built, &func));
    }

    #[test]
    fn test_exact_call_path_invokes_handler_with_owner() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let table = table(vec![("m:f()", recording_handler(Arc::clone(&seen)))]);
        let func = NativeFn::new("f", |_| Ok(Value::none())).into_value();
        let owner = DynObject::new("module").into_value();

        let built = build(func.clone(), &"m:f".into(), &owner, &table).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(Value::same(&seen[0].0, &func));
        assert!(Value::same(&seen[0].1, &owner));
        assert!(Value::same(&built, &func));
    }

    #[test]
    fn test_callable_result_is_rebuilt() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let table = table(vec![("m:Ctor().method()", recording_handler(Arc::clone(&seen)))]);

        let instance = DynObject::new("Instance")
            .with_attr("method", NativeFn::new("method", |_| Ok(Value::from(7))).into_value())
            .into_value();
        let raw = instance.clone();
        let ctor = NativeFn::new("Ctor", move |_| Ok(instance.clone())).into_value();

        let proxied = build(ctor, &"m:Ctor".into(), &Value::none(), &table).unwrap();
        assert!(proxied.is_callable());

        let made = proxied.call(CallArgs::new()).unwrap();
        assert!(!Value::same(&made, &raw));
        assert!(seen.lock().is_empty());

        let method = made.get_attr("method").unwrap();
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(method.call(CallArgs::new()).unwrap().as_i64(), Some(7));
        assert!(Value::same(&seen.lock()[0].1, &raw));
    }

    #[test]
    fn test_attribute_handler_receives_owner() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let table = table(vec![("m:client.create", recording_handler(Arc::clone(&seen)))]);

        let create = NativeFn::new("create", |_| Ok(Value::none())).into_value();
        let client = DynObject::new("Client")
            .with_attr("create", create.clone())
            .with_attr("close", NativeFn::new("close", |_| Ok(Value::none())).into_value())
            .into_value();

        let proxied = build(client.clone(), &"m:client".into(), &Value::none(), &table).unwrap();
        assert!(!Value::same(&proxied, &client));

        proxied.get_attr("create").unwrap();
        let close = proxied.get_attr("close").unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(Value::same(&seen[0].0, &create));
        assert!(Value::same(&seen[0].1, &client));
        assert!(!Value::same(&close, &create));
        assert_eq!(
            proxied.as_object().unwrap().attr_names(),
            client.as_object().unwrap().attr_names()
        );
    }

    #[test]
    fn test_prefix_alone_never_invokes_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler: Handler = Arc::new(move |original: Value, _: Value| -> Result<Value> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(original)
        });
        let table = table(vec![("m:a.b.c", handler)]);

        let c = DynObject::new("C").into_value();
        let b = DynObject::new("B").with_attr("c", c).into_value();
        let a = DynObject::new("A").with_attr("b", b).into_value();

        let proxied = build(a, &"m:a".into(), &Value::none(), &table).unwrap();
        let b = proxied.get_attr("b").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        b.get_attr("c").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        let handler: Handler = Arc::new(|_: Value, _: Value| -> Result<Value> {
            Err(EngineError::HandlerFailed("denied".into()))
        });
        let table = table(vec![("m:f()", handler)]);
        let func = NativeFn::new("f", |_| Ok(Value::none())).into_value();

        let err = build(func, &"m:f".into(), &Value::none(), &table).unwrap_err();
        assert!(matches!(err, EngineError::HandlerFailed(msg) if msg == "denied"));

        let table = table_with_inner_error();
        let failing = NativeFn::new("g", |_| Err(EngineError::InvalidArgument("bad".into()))).into_value();
        let proxied = build(failing, &"m:g".into(), &Value::none(), &table).unwrap();
        let err = proxied.call(CallArgs::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(msg) if msg == "bad"));
    }

    fn table_with_inner_error() -> Arc<InterceptionTable> {
        let passthrough: Handler = Arc::new(|original: Value, _: Value| -> Result<Value> { Ok(original) });
        table(vec![("m:g().x", passthrough)])
    }
}
