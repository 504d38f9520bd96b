// packages/engine/src/interception/path.rs
//! Capability paths
//!
//! `<module>:<segment>(.<segment>)*` where a segment is an identifier,
//! optionally followed by `()` meaning "the value returned by calling it".
//! Paths are compared as opaque strings.

use std::fmt;

/// Separates the module name from the attribute chain
pub const MODULE_SEPARATOR: char = ':';

/// Segment suffix for "result of calling this"
pub const CALL_MARKER: &str = "()";

/// An accumulated capability path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityPath(String);

impl CapabilityPath {
    /// Base path for a module: `module:`
    pub fn root(module: &str) -> Self {
        Self(format!("{}{}", module, MODULE_SEPARATOR))
    }

    /// Path of attribute `name` reached from this path
    pub fn attr(&self, name: &str) -> Self {
        if self.0.ends_with(MODULE_SEPARATOR) {
            Self(format!("{}{}", self.0, name))
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    /// Path of the value returned by calling this path
    pub fn call(&self) -> Self {
        Self(format!("{}{}", self.0, CALL_MARKER))
    }

    pub fn module_name(&self) -> &str {
        module_name_of(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CapabilityPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CapabilityPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for CapabilityPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Module component of a path: everything before the first `:`,
/// or the whole string when there is no separator.
pub fn module_name_of(path: &str) -> &str {
    path.split_once(MODULE_SEPARATOR)
        .map_or(path, |(module, _)| module)
}

/// Whether a path could ever be produced by walking a module.
///
/// Only used to warn about keys that can never match; such keys are still
/// accepted.
pub fn is_well_formed(path: &str) -> bool {
    let Some((module, chain)) = path.split_once(MODULE_SEPARATOR) else {
        return false;
    };

    !module.is_empty()
        && !chain.is_empty()
        && chain.split('.').all(|segment| {
            let mut ident = segment;
            while let Some(stripped) = ident.strip_suffix(CALL_MARKER) {
                ident = stripped;
            }
            !ident.is_empty() && ident.chars().all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_building() {
        let path = CapabilityPath::root("openai")
            .attr("OpenAI")
            .call()
            .attr("chat")
            .attr("completions")
            .attr("create");

        assert_eq!(path.as_str(), "openai:OpenAI().chat.completions.create");
        assert_eq!(path.module_name(), "openai");
        assert_eq!(path.call().to_string(), "openai:OpenAI().chat.completions.create()");
    }

    #[test]
    fn test_module_name_of() {
        assert_eq!(module_name_of("m:f()"), "m");
        assert_eq!(module_name_of("no_separator"), "no_separator");
        assert_eq!(module_name_of(":f"), "");
    }

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed("m:f()"));
        assert!(is_well_formed("m:Ctor().method()"));
        assert!(is_well_formed("m:f()()"));
        assert!(is_well_formed("openai:OpenAI().chat.completions.create"));

        assert!(!is_well_formed("m"));
        assert!(!is_well_formed(":f"));
        assert!(!is_well_formed("m:"));
        assert!(!is_well_formed("m:().f"));
        assert!(!is_well_formed("m:f..g"));
    }
}
