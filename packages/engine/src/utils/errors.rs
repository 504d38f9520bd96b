// packages/engine/src/utils/errors.rs
//! Engine error type
//!
//! Errors raised by handlers and by wrapped callables travel through the
//! proxies untouched; the engine never rewraps them.

use thiserror::Error;

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// No finder in the resolution chain produced a spec for this module
    #[error("No module named '{0}'")]
    ModuleNotFound(String),

    /// Attribute lookup on an object failed
    #[error("'{type_name}' object has no attribute '{name}'")]
    AttributeNotFound { type_name: String, name: String },

    /// Value was invoked but does not support calls
    #[error("'{0}' object is not callable")]
    NotCallable(String),

    /// Attribute assignment is not supported by the object
    #[error("Cannot set attribute '{name}' on '{type_name}' object")]
    ReadOnlyAttribute { type_name: String, name: String },

    /// Call arguments did not match what the callee expects
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Module body failed while populating the module
    #[error("Module '{module}' failed to initialize: {reason}")]
    ModuleInitFailed { module: String, reason: String },

    /// Raised by instrumentation handlers
    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Recording error
    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Shorthand for [`EngineError::AttributeNotFound`]
    pub fn attribute_not_found(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}
