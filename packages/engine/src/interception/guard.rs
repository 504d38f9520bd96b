// packages/engine/src/interception/guard.rs
//! Reentrancy guard for module resolution
//!
//! While the resolver hook asks the registry for the real spec of a module,
//! the registry walks the whole finder chain again, hook included. The guard
//! marks the name as in flight so the nested lookup is refused and falls
//! through to the default finders.

use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::trace;

/// Names currently being resolved by the engine itself
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as in flight. Returns `None` if it already is.
    ///
    /// The mark is released when the token drops, on every exit path.
    pub fn enter(&self, name: &str) -> Option<GuardToken<'_>> {
        if !self.in_flight.lock().insert(name.to_string()) {
            return None;
        }
        trace!("Entered resolution of '{}'", name);
        Some(GuardToken {
            guard: self,
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.in_flight.lock().contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.lock().is_empty()
    }
}

/// Scoped in-flight mark
#[derive(Debug)]
pub struct GuardToken<'a> {
    guard: &'a ReentrancyGuard,
    name: String,
}

impl GuardToken<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.lock().remove(&self.name);
        trace!("Left resolution of '{}'", self.name);
    }
}
