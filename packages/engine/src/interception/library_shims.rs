// packages/engine/src/interception/library_shims.rs
//! Library shims
//!
//! Offline stand-ins for SDK modules, written against the interceptable
//! object adapters. They let agents (and tests) import `openai` through a
//! registry without network access, with the same attribute and call shape
//! as the real client: `OpenAI().chat.completions.create(model=, messages=)`.

use crate::loader::ModuleSource;
use crate::object::{CallArgs, DynObject, NativeClass, NativeFn, Value};
use crate::utils::errors::{EngineError, Result};
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Configuration for library shims
#[derive(Debug, Clone)]
pub struct ShimConfig {
    /// Module name the OpenAI shim registers under
    pub openai_module: String,

    /// Model reported when a request does not name one
    pub default_model: String,

    /// Prefix for canned replies; the reply echoes the last message
    pub reply_prefix: String,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            openai_module: "openai".to_string(),
            default_model: "gpt-3.5-turbo".to_string(),
            reply_prefix: "mock: ".to_string(),
        }
    }
}

/// Builds shim modules and counts the requests they serve
pub struct LibraryShim {
    config: ShimConfig,
    requests: Arc<AtomicU64>,
}

impl LibraryShim {
    pub fn new(config: ShimConfig) -> Self {
        Self {
            config,
            requests: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Completion requests served by every client built from this shim
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Module source exposing `OpenAI` and `VERSION`
    pub fn openai_source(&self) -> ModuleSource {
        let config = self.config.clone();
        let requests = Arc::clone(&self.requests);

        ModuleSource::new(self.config.openai_module.clone(), move |module, _registry| {
            let config = config.clone();
            let requests = Arc::clone(&requests);
            module.set("VERSION", "1.0.0-shim");
            module.set(
                "OpenAI",
                NativeClass::new("OpenAI", move |args: CallArgs| {
                    Ok(openai_client(&args, &config, &requests))
                })
                .into_value(),
            );
            Ok(())
        })
    }
}

impl Default for LibraryShim {
    fn default() -> Self {
        Self::new(ShimConfig::default())
    }
}

fn openai_client(args: &CallArgs, config: &ShimConfig, requests: &Arc<AtomicU64>) -> Value {
    let api_key = args
        .kwarg("api_key")
        .and_then(Value::as_str)
        .unwrap_or("sk-shim")
        .to_string();
    debug!("Constructing OpenAI shim client");

    let create = {
        let config = config.clone();
        let requests = Arc::clone(requests);
        NativeFn::new("create", move |args: CallArgs| {
            requests.fetch_add(1, Ordering::SeqCst);
            chat_completion(&args, &config)
        })
    };

    let list_models = {
        let model = config.default_model.clone();
        NativeFn::new("list", move |_| {
            Ok(Value::from(json!({ "data": [{ "id": model, "object": "model" }] })))
        })
    };

    let completions = DynObject::new("Completions").with_attr("create", create.into_value());
    let chat = DynObject::new("Chat").with_attr("completions", completions.into_value());
    let models = DynObject::new("Models").with_attr("list", list_models.into_value());

    DynObject::new("OpenAI")
        .with_attr("api_key", api_key)
        .with_attr("chat", chat.into_value())
        .with_attr("models", models.into_value())
        .into_value()
}

fn chat_completion(args: &CallArgs, config: &ShimConfig) -> Result<Value> {
    let messages = args
        .require_kwarg("messages")?
        .as_data()
        .and_then(JsonValue::as_array)
        .ok_or_else(|| EngineError::InvalidArgument("messages must be a list".to_string()))?;

    let model = args
        .kwarg("model")
        .and_then(Value::as_str)
        .unwrap_or(config.default_model.as_str());

    let last = messages
        .last()
        .and_then(|msg| msg.get("content"))
        .and_then(JsonValue::as_str)
        .unwrap_or_default();

    Ok(Value::from(json!({
        "id": format!("chatcmpl-{}", ulid::Ulid::new()),
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": format!("{}{}", config.reply_prefix, last) },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": messages.len(), "completion_tokens": 1 }
    })))
}
