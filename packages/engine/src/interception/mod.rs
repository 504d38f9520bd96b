// packages/engine/src/interception/mod.rs
//! Transparent call interception
//!
//! Given a table of capability paths and handlers, rewrites what importing a
//! module through the registry produces, so that matching calls and
//! attribute chains run through user-supplied instrumentation. Neither the
//! intercepted module nor its call sites change.
//!
//! - **Path**: capability path syntax (`openai:OpenAI().chat.completions.create`)
//! - **Table**: immutable path → handler mapping with prefix relevance
//! - **Guard**: reentrancy guard for self-resolution
//! - **Finder**: resolver hook at the front of the finder chain
//! - **Proxy Loader**: builds the intercepted module from the real one
//! - **Proxy**: callable and attribute proxy nodes
//! - **Context**: install/uninstall lifecycle for one table
//! - **Handlers**: named built-in handlers for configuration
//! - **Library Shims**: offline SDK stand-ins
//!
//! # Architecture
//!
//! ```text
//! Agent Code (Unmodified)
//!     │ registry.import("openai")
//!     ▼
//! InterceptFinder ── guard ──► real spec ──► ProxyLoader
//!                                              │ build(attr, "openai:<name>")
//!                                              ▼
//!     OpenAI ──call──► AttributeProxy("openai:OpenAI()")
//!                          .chat ──► AttributeProxy("...chat")
//!                          .completions.create ──► handler(create, completions)
//! ```
//!
//! # Concurrency
//!
//! The engine is synchronous and adds no suspension points. Install
//! contexts and complete the first import of each intercepted module before
//! sharing the registry across threads: two threads racing on the first
//! import of the same module may both resolve it, but only the first to
//! reach the cache runs its loader and both get that module.

pub mod context;
pub mod finder;
pub mod guard;
pub mod handlers;
pub mod library_shims;
pub mod path;
pub mod proxy;
pub mod proxy_loader;
pub mod table;

// Re-export commonly used types
pub use context::InterceptionContext;
pub use finder::InterceptFinder;
pub use guard::{GuardToken, ReentrancyGuard};
pub use handlers::{HandlerFactory, HandlerRegistry};
pub use library_shims::{LibraryShim, ShimConfig};
pub use path::{CapabilityPath, CALL_MARKER};
pub use proxy::{build, AttributeProxy, CallableProxy};
pub use proxy_loader::ProxyLoader;
pub use table::{Handler, InterceptionTable, InterceptionTableBuilder};
