use super::defaults::{
    DEFAULT_MAX_TOKENS, DEFAULT_MAX_TURNS, DEFAULT_MODEL, DEFAULT_PROVIDER_ID,
    DEFAULT_QUERY_TEMPLATE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOOL_TIMEOUT_SECS,
};
use super::error::ConfigError;
use super::provider::ModelProviderConfig;
use super::server::ServerConfig;
use std::path::Path;
use std::time::Duration;

/// Application configuration loaded from client.toml
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_provider: String,
    pub model: String,
    pub max_tokens: u32,
    pub max_turns: usize,
    pub request_timeout_secs: u64,
    pub tool_timeout_secs: u64,
    pub channel: Option<String>,
    pub query_template: String,
    pub server: Option<ServerConfig>,
    pub providers: Vec<ModelProviderConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: DEFAULT_PROVIDER_ID.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_turns: DEFAULT_MAX_TURNS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            channel: None,
            query_template: DEFAULT_QUERY_TEMPLATE.to_string(),
            server: None,
            providers: vec![ModelProviderConfig::openai_default()],
        }
    }
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Apply a channel override; blank values are ignored.
    pub fn with_channel(mut self, channel: Option<String>) -> Self {
        if let Some(channel) = channel.filter(|c| !c.trim().is_empty()) {
            self.channel = Some(channel.trim().to_string());
        }
        self
    }

    pub fn with_server(mut self, server: Option<ServerConfig>) -> Self {
        if server.is_some() {
            self.server = server;
        }
        self
    }

    pub fn require_channel(&self) -> Result<&str, ConfigError> {
        self.channel
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(ConfigError::MissingChannel)
    }

    pub fn require_server(&self) -> Result<&ServerConfig, ConfigError> {
        match &self.server {
            Some(server) if !server.command.as_os_str().is_empty() => Ok(server),
            _ => Err(ConfigError::MissingServer),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}
