//! Boot: logging init, config load, state creation.

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::AgentConfig;
use crate::runtime::blocking::install_panic_hook;
use crate::state::{AgentState, SharedState};

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diag_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load and validate config, then build the shared state.
///
/// Returns `(SharedState, AgentConfig)` on success.
pub fn boot() -> Result<(SharedState, AgentConfig), Box<dyn std::error::Error>> {
    info!("Starting diag-agent v{}", env!("CARGO_PKG_VERSION"));
    install_panic_hook();

    let config = AgentConfig::load()?;
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    info!("Loaded configuration: bind_address={}", config.bind_address);

    if config.log_file.is_empty() {
        error!("No log file configured (set log_file or DIAG_LOG_FILE); SearchLog will fail");
    } else {
        info!("Searching log family of: {}", config.log_file);
    }
    info!(
        "Search: batch_size={}, probe_lines={}, meta_cache_capacity={}, stop_at_window_end={}",
        config.search.batch_size,
        config.search.probe_lines,
        config.search.meta_cache_capacity,
        config.search.stop_at_window_end
    );

    let state = Arc::new(AgentState::new(config.clone()));
    Ok((state, config))
}
