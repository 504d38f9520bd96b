// packages/engine/tests/openai_shim.rs
//! Instrumenting the OpenAI shim from configuration

use sentra_lab_intercept::interception::{HandlerRegistry, InterceptionContext, LibraryShim};
use sentra_lab_intercept::loader::{ModuleRegistry, SourceFinder};
use sentra_lab_intercept::recording::{CallEventType, CallRecorder};
use sentra_lab_intercept::utils::config::EngineConfig;
use sentra_lab_intercept::{CallArgs, Value};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

const CONFIG: &str = r#"
[interception]
enabled = true

[[interception.rules]]
path = "openai:OpenAI().chat.completions.create"
handler = "record_calls"

[[interception.rules]]
path = "openai:OpenAI().models.list"
handler = "log_completion"

[recording]
queue_capacity = 64
"#;

fn load_config() -> EngineConfig {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    EngineConfig::load_from(file.path()).unwrap()
}

fn ask(openai: &Value, question: &str) -> Value {
    let client = openai.get_attr("OpenAI").unwrap().call(CallArgs::new()).unwrap();
    client
        .get_path("chat.completions.create")
        .unwrap()
        .call(
            CallArgs::new()
                .with_kwarg("model", "gpt-3.5-turbo")
                .with_kwarg("messages", json!([{ "role": "user", "content": question }])),
        )
        .unwrap()
}

#[test]
fn test_configured_recording() {
    let config = load_config();
    let shim = LibraryShim::default();
    let registry = ModuleRegistry::new(Arc::new(SourceFinder::new().with_source(shim.openai_source())));

    let recorder = Arc::new(CallRecorder::new(&config.recording).unwrap());
    let handlers = HandlerRegistry::with_builtins().with_recorder(Arc::clone(&recorder));
    let context = InterceptionContext::from_config(&config.interception, &handlers).unwrap();
    context.install(&registry).unwrap();

    let openai = Value::Object(registry.import("openai").unwrap());
    let reply = ask(&openai, "ping");

    assert_eq!(
        reply.as_data().unwrap()["choices"][0]["message"]["content"],
        "mock: ping"
    );
    assert_eq!(shim.request_count(), 1);

    let events = recorder.drain();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, CallEventType::CallStarted);
    assert_eq!(events[0].path, "openai:OpenAI().chat.completions.create");
    assert_eq!(events[0].data["kwargs"]["messages"][0]["content"], "ping");
    assert_eq!(events[1].event_type, CallEventType::CallCompleted);
    assert_eq!(
        events[1].data["result"]["choices"][0]["message"]["content"],
        "mock: ping"
    );
}

#[test]
fn test_unrelated_client_surface_is_not_recorded() {
    let config = load_config();
    let shim = LibraryShim::default();
    let registry = ModuleRegistry::new(Arc::new(SourceFinder::new().with_source(shim.openai_source())));

    let recorder = Arc::new(CallRecorder::new(&config.recording).unwrap());
    let handlers = HandlerRegistry::with_builtins().with_recorder(Arc::clone(&recorder));
    let context = InterceptionContext::from_config(&config.interception, &handlers).unwrap();
    context.install(&registry).unwrap();

    let openai = Value::Object(registry.import("openai").unwrap());
    let client = openai.get_attr("OpenAI").unwrap().call(CallArgs::new()).unwrap();

    assert_eq!(client.get_attr("api_key").unwrap().as_str(), Some("sk-shim"));
    let models = client.get_path("models.list").unwrap().call(CallArgs::new()).unwrap();
    assert_eq!(models.as_data().unwrap()["data"][0]["id"], "gpt-3.5-turbo");

    assert!(recorder.is_empty());
    assert_eq!(shim.request_count(), 0);
}

#[test]
fn test_disabled_context_leaves_sdk_alone() {
    let shim = LibraryShim::default();
    let registry = ModuleRegistry::new(Arc::new(SourceFinder::new().with_source(shim.openai_source())));
    let recorder = Arc::new(CallRecorder::default());
    let handlers = HandlerRegistry::with_builtins().with_recorder(Arc::clone(&recorder));
    let _context = InterceptionContext::from_config(&load_config().interception, &handlers).unwrap();

    let openai = Value::Object(registry.import("openai").unwrap());
    ask(&openai, "hello");

    assert!(recorder.is_empty());
    assert_eq!(shim.request_count(), 1);
}
