//! One scheduled summarization run against a freshly spawned tool server.

use super::agent::{Agent, AgentError, AgentOptions, AgentOutcome};
use super::catalog;
use super::schedule::Job;
use super::tooling::{McpProcess, ToolHost, ToolInvokeError};
use crate::config::defaults::CHANNEL_PLACEHOLDER;
use crate::config::{AppConfig, ConfigError, ServerConfig};
use crate::model::ModelProvider;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("tool server unavailable: {0}")]
    Tool(#[from] ToolInvokeError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Substitute the channel into a query template.
pub fn render_query(template: &str, channel: &str) -> String {
    template.replace(CHANNEL_PLACEHOLDER, channel)
}

pub struct DigestJob<P: ModelProvider> {
    provider: P,
    server: ServerConfig,
    query: String,
    options: AgentOptions,
    tool_timeout: Duration,
}

impl<P: ModelProvider> DigestJob<P> {
    /// Validates that a channel and a server are configured.
    pub fn new(config: &AppConfig, provider: P) -> Result<Self, ConfigError> {
        let channel = config.require_channel()?;
        let server = config.require_server()?.clone();
        Ok(Self {
            provider,
            server,
            query: render_query(&config.query_template, channel),
            options: AgentOptions::from_config(config),
            tool_timeout: config.tool_timeout(),
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub async fn run_once(&self) -> Result<AgentOutcome, DigestError> {
        let session = McpProcess::connect(self.server.clone(), self.tool_timeout).await?;
        let result = self.converse(&session).await;
        session.shutdown().await;
        result
    }

    async fn converse(&self, host: &dyn ToolHost) -> Result<AgentOutcome, DigestError> {
        let tools = host.list_tools().await?;
        let names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
        info!(server = %self.server.name, tools = ?names, "Connected to server with tools");
        if tools.is_empty() {
            warn!(server = %self.server.name, "Server advertised no tools");
        }

        let specs = catalog::to_function_specs(&tools);
        let agent = Agent::new(&self.provider, host, &specs);
        Ok(agent.run(self.query.clone(), &self.options).await?)
    }
}

#[async_trait]
impl<P: ModelProvider> Job for DigestJob<P> {
    type Output = AgentOutcome;
    type Error = DigestError;

    async fn run_once(&self) -> Result<AgentOutcome, DigestError> {
        DigestJob::run_once(self).await
    }
}
