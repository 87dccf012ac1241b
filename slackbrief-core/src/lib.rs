//! Core of slackbrief: configuration, model providers, the MCP stdio
//! transport, and the tool-calling loop that ties them together.

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, catalog, digest, schedule, tooling};
pub use config::{AppConfig, ModelProviderConfig, ServerConfig};
pub use domain::types;
pub use infrastructure::model;

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// program output. Safe to call more than once.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
