//! MCP stdio server exposing Slack and US weather tools.

pub mod config;
pub mod rpc;
pub mod server;
pub mod tools;

pub use config::{ServerSettings, SettingsError};
pub use server::McpServer;
pub use tools::{ToolHandler, ToolOutcome, ToolRegistry, ToolSpec};

use tracing_subscriber::{EnvFilter, fmt};

/// stdout carries protocol frames, so logs always go to stderr.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .init();
    });
}
