// packages/engine/src/main.rs
//! Sentra Lab Interception Engine
//!
//! Demo driver: imports the offline OpenAI shim through an intercepting
//! registry, sends one chat completion and prints the recorded call events.

use anyhow::{Context, Result};
use sentra_lab_intercept::interception::{HandlerRegistry, InterceptionContext, LibraryShim};
use sentra_lab_intercept::loader::{ModuleRegistry, SourceFinder};
use sentra_lab_intercept::observability::init_tracing;
use sentra_lab_intercept::recording::CallRecorder;
use sentra_lab_intercept::utils::config::{EngineConfig, InterceptionRule};
use sentra_lab_intercept::{BuildInfo, CallArgs, Value};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const COMPLETION_PATH: &str = "openai:OpenAI().chat.completions.create";

fn main() -> Result<()> {
    let mut config = EngineConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    let build = BuildInfo::current();
    info!(
        "Starting Sentra Lab Interception Engine v{} ({}, built {} with {})",
        build.version, build.git_hash, build.build_timestamp, build.rustc_version
    );

    if config.interception.rules.is_empty() {
        config.interception.rules = vec![
            InterceptionRule {
                path: COMPLETION_PATH.to_string(),
                handler: "log_completion".to_string(),
            },
            InterceptionRule {
                path: "openai:OpenAI().models.list".to_string(),
                handler: "record_calls".to_string(),
            },
        ];
    }

    let shim = LibraryShim::default();
    let registry = ModuleRegistry::new(Arc::new(
        SourceFinder::new().with_source(shim.openai_source()),
    ));

    let recorder = Arc::new(CallRecorder::new(&config.recording)?);
    let handlers = HandlerRegistry::with_builtins().with_recorder(Arc::clone(&recorder));
    let context = InterceptionContext::from_config(&config.interception, &handlers)?;

    if config.interception.enabled {
        context.install(&registry)?;
    } else {
        info!("Interception disabled by configuration");
    }

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is the meaning of life?".to_string());

    let openai = Value::Object(registry.import("openai")?);
    let client = openai.get_attr("OpenAI")?.call(CallArgs::new())?;

    let reply = client.get_path("chat.completions.create")?.call(
        CallArgs::new()
            .with_kwarg("model", "gpt-3.5-turbo")
            .with_kwarg("messages", json!([{ "role": "user", "content": question }])),
    )?;
    client.get_path("models.list")?.call(CallArgs::new())?;

    if let Some(content) = reply
        .as_data()
        .and_then(|data| data.pointer("/choices/0/message/content"))
        .and_then(|content| content.as_str())
    {
        println!("{}", content);
    }

    println!("{}", recorder.drain_json()?);

    context.uninstall(&registry);
    Ok(())
}
