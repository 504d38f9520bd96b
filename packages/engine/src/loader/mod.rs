// packages/engine/src/loader/mod.rs
//! Module resolution
//!
//! A small host module system the interception engine plugs into:
//!
//! - **Module**: named object whose attributes are its exports
//! - **Registry**: ordered finder chain plus module cache
//! - **Source Finder**: default finder backed by module initializers
//!
//! # Architecture
//!
//! ```text
//! registry.import("openai")
//!     │
//!     ├─ cache hit ──────────────────────────────► Arc<Module>
//!     │
//!     └─ find_spec: [hook N, ..., hook 1, SourceFinder]
//!                        │ first Some(spec) wins
//!                        ▼
//!        empty Module ─► cache ─► spec.loader.exec_module()
//! ```

pub mod module;
pub mod registry;
pub mod source;

pub use module::Module;
pub use registry::{FinderId, ModuleFinder, ModuleLoader, ModuleRegistry, ModuleSpec};
pub use source::{ModuleSource, SourceFinder};
