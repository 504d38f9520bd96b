// packages/engine/src/observability/mod.rs
//! Tracing setup and metric names

use crate::utils::config::LoggingConfig;
use crate::utils::errors::{EngineError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Modules built through a proxy loader
pub const MODULES_INTERCEPTED: &str = "intercept_modules_total";

/// Handler invocations at exact path matches
pub const HANDLER_INVOCATIONS: &str = "intercept_handler_invocations_total";

/// Callable and attribute proxies constructed
pub const PROXIES_BUILT: &str = "intercept_proxies_built_total";

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| EngineError::ConfigError(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| EngineError::ConfigError(format!("Failed to initialize tracing: {}", e)))
}

