// packages/engine/src/utils/mod.rs
//! Common utilities: configuration loading and the engine error type.

pub mod config;
pub mod errors;

pub use self::config::{EngineConfig, InterceptionConfig, InterceptionRule, LoggingConfig, RecordingConfig};
pub use self::errors::{EngineError, Result};
