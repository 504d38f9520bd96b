// packages/engine/src/object/mod.rs
//! Interceptable object model
//!
//! The engine never reflects over arbitrary Rust values. Instead, anything it
//! can proxy implements [`Interceptable`]: enumerate attribute names, get or
//! set an attribute by name, and report whether it can be called. Concrete
//! integrations (an SDK client, a test fake) expose themselves through the
//! thin adapters in [`native`].
//!
//! ```text
//! Value
//! ├─ Data(serde_json::Value)      plain data, never proxied
//! └─ Object(Arc<dyn Interceptable>)
//!      ├─ Module                   exports
//!      ├─ DynObject                attribute bag
//!      ├─ NativeFn                 callable
//!      └─ NativeClass              callable constructor + static attrs
//! ```

pub mod interceptable;
pub mod native;
pub mod value;

pub use interceptable::{Interceptable, ObjectRef};
pub use native::{DynObject, NativeClass, NativeFn};
pub use value::{CallArgs, Value};
