// packages/engine/src/lib.rs
//! Sentra Lab Interception Engine Library
//!
//! Transparently instruments SDK modules (e.g. logging every request and
//! response sent to a completion API) without modifying the SDK or any of
//! its call sites.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **object**: the interceptable-capability interface and adapters
//! - **loader**: module registry, finder chain and module cache
//! - **interception**: capability paths, interception table, resolver hook,
//!   proxy loader and proxy nodes
//! - **recording**: call event capture for instrumentation handlers
//! - **observability**: tracing setup and metric names
//! - **utils**: configuration and errors
//!
//! # Example
//!
//! ```no_run
//! use sentra_lab_intercept::interception::{InterceptionContext, InterceptionTable, LibraryShim};
//! use sentra_lab_intercept::loader::{ModuleRegistry, SourceFinder};
//! use std::sync::Arc;
//!
//! let shim = LibraryShim::default();
//! let registry = ModuleRegistry::new(Arc::new(SourceFinder::new().with_source(shim.openai_source())));
//!
//! let context = InterceptionContext::new(
//!     InterceptionTable::builder()
//!         .intercept("openai:OpenAI().chat.completions.create", |create, _owner| Ok(create))
//!         .build(),
//! );
//! context.install(&registry).unwrap();
//!
//! let openai = registry.import("openai").unwrap();
//! ```

// Public module exports
pub mod interception;
pub mod loader;
pub mod object;
pub mod observability;
pub mod recording;
pub mod utils;

// Re-export commonly used types
pub use interception::{InterceptionContext, InterceptionTable};
pub use loader::{Module, ModuleRegistry};
pub use object::{CallArgs, Interceptable, Value};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Engine build information
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_build_info() {
        let info = BuildInfo::current();
        assert!(!info.version.is_empty());
        assert!(!info.git_hash.is_empty());
    }
}
