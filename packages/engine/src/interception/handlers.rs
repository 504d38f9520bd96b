// packages/engine/src/interception/handlers.rs
//! Named instrumentation handlers
//!
//! Configuration refers to handlers by name. Each name maps to a factory
//! that receives the capability path the handler is being installed at.
//!
//! Built-ins:
//! - `passthrough`: returns the original unchanged
//! - `log_completion`: logs chat-completion requests and replies line by line
//! - `record_calls`: records call events into a [`CallRecorder`]
//!   (registered by [`HandlerRegistry::with_recorder`])

use crate::interception::table::Handler;
use crate::object::{CallArgs, NativeFn, Value};
use crate::recording::{CallEvent, CallEventType, CallRecorder};
use crate::utils::errors::{EngineError, Result};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Log target for completion transcripts
pub const COMPLETION_TARGET: &str = "sentra::completion";

/// Builds a handler for a given capability path
pub type HandlerFactory = Arc<dyn Fn(&str) -> Handler + Send + Sync>;

/// Registry of handlers addressable by name
#[derive(Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `passthrough` and `log_completion`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_handler("passthrough", passthrough());
        registry.register_handler("log_completion", log_completion());
        registry
    }

    /// Add `record_calls`, writing into `recorder`
    pub fn with_recorder(mut self, recorder: Arc<CallRecorder>) -> Self {
        self.register("record_calls", move |path| {
            record_calls(Arc::clone(&recorder), path)
        });
        self
    }

    /// Register a path-aware handler factory
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str) -> Handler + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Register a handler that does not care where it is installed
    pub fn register_handler(&mut self, name: impl Into<String>, handler: Handler) {
        self.register(name, move |_| Arc::clone(&handler));
    }

    /// Instantiate handler `name` for `path`
    pub fn handler_for(&self, name: &str, path: &str) -> Result<Handler> {
        self.factories
            .get(name)
            .map(|factory| factory(path))
            .ok_or_else(|| EngineError::ConfigError(format!("Unknown handler '{}'", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Returns the original value unchanged
pub fn passthrough() -> Handler {
    Arc::new(|original: Value, _owner: Value| -> Result<Value> { Ok(original) })
}

/// Wraps a completion-create callable and logs the transcript
///
/// Each line of each request message's `content` is logged as `> line`,
/// each line of the first choice's reply as `< line`.
pub fn log_completion() -> Handler {
    Arc::new(|original: Value, _owner: Value| -> Result<Value> {
        if !original.is_callable() {
            return Ok(original);
        }

        Ok(NativeFn::new("logged_completion", move |args: CallArgs| {
            for line in request_lines(&args) {
                info!(target: COMPLETION_TARGET, "> {}", line);
            }

            let result = original.call(args)?;

            if let Some(content) = completion_content(&result) {
                for line in content.split('\n') {
                    info!(target: COMPLETION_TARGET, "< {}", line);
                }
            }

            Ok(result)
        })
        .into_value())
    })
}

/// Records started/completed/failed events around every call
///
/// Non-callable values are recorded as a single attribute read and returned
/// as is. A full recorder drops events rather than failing the call.
pub fn record_calls(recorder: Arc<CallRecorder>, path: impl Into<String>) -> Handler {
    let path: String = path.into();

    Arc::new(move |original: Value, _owner: Value| -> Result<Value> {
        if !original.is_callable() {
            push(
                &recorder,
                CallEvent::new(
                    &path,
                    CallEventType::AttributeRead,
                    json!({ "value": summarize(&original) }),
                ),
            );
            return Ok(original);
        }

        let recorder = Arc::clone(&recorder);
        let path = path.clone();
        Ok(NativeFn::new(format!("recorded {}", path), move |args: CallArgs| {
            push(
                &recorder,
                CallEvent::new(&path, CallEventType::CallStarted, summarize_args(&args)),
            );

            let started = Instant::now();
            let result = original.call(args);
            let elapsed_us = started.elapsed().as_micros() as u64;

            let event = match &result {
                Ok(value) => CallEvent::new(
                    &path,
                    CallEventType::CallCompleted,
                    json!({ "result": summarize(value) }),
                ),
                Err(e) => CallEvent::new(
                    &path,
                    CallEventType::CallFailed,
                    json!({ "error": e.to_string() }),
                ),
            };
            push(&recorder, event.with_duration_us(elapsed_us));

            result
        })
        .into_value())
    })
}

fn push(recorder: &CallRecorder, event: CallEvent) {
    if let Err(e) = recorder.record(event) {
        warn!("Dropping call event: {}", e);
    }
}

fn request_lines(args: &CallArgs) -> Vec<String> {
    args.kwarg("messages")
        .and_then(Value::as_data)
        .and_then(JsonValue::as_array)
        .map(|messages| {
            messages
                .iter()
                .filter_map(|msg| msg.get("content").and_then(JsonValue::as_str))
                .flat_map(|content| content.split('\n'))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn completion_content(result: &Value) -> Option<String> {
    let content = match result {
        Value::Data(data) => data.pointer("/choices/0/message/content")?.as_str()?.to_string(),
        Value::Object(obj) => obj
            .get_attr("choices")
            .ok()?
            .as_data()?
            .pointer("/0/message/content")?
            .as_str()?
            .to_string(),
    };
    Some(content)
}

fn summarize(value: &Value) -> JsonValue {
    match value {
        Value::Data(data) => data.clone(),
        Value::Object(obj) => JsonValue::String(format!("<{}>", obj.type_name())),
    }
}

fn summarize_args(args: &CallArgs) -> JsonValue {
    let positional: Vec<JsonValue> = args.positional.iter().map(summarize).collect();
    let keyword: serde_json::Map<String, JsonValue> = args
        .keyword
        .iter()
        .map(|(name, value)| (name.clone(), summarize(value)))
        .collect();
    json!({ "args": positional, "kwargs": keyword })
}
