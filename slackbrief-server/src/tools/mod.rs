//! Tool handlers and the registry the server dispatches through.
//!
//! Each handler validates its own arguments, performs its upstream request,
//! and formats the answer as text. Handlers never fail past their boundary:
//! every problem becomes a [`ToolOutcome::Failure`].

pub mod args;
pub mod slack;
pub mod weather;

use crate::config::ServerSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

/// Metadata advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn to_mcp(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

impl ToolOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutcome::Failure(_))
    }

    pub fn text(&self) -> &str {
        match self {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        }
    }

    /// Render as an MCP `CallToolResult`.
    pub fn into_call_result(self) -> Value {
        let is_error = self.is_failure();
        let text = match self {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        };
        json!({
            "content": [{"type": "text", "text": text}],
            "isError": is_error,
        })
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn spec(&self) -> ToolSpec;

    async fn call(&self, arguments: Value) -> ToolOutcome;
}

/// Handlers in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: Vec<Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; a later handler with the same name replaces the
    /// earlier one in place.
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) {
        let name = handler.spec().name;
        if let Some(slot) = self.handlers.iter_mut().find(|h| h.spec().name == name) {
            *slot = handler;
        } else {
            self.handlers.push(handler);
        }
    }

    pub fn with(mut self, handler: impl ToolHandler + 'static) -> Self {
        self.register(Box::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.spec().name == name)
            .map(|handler| handler.as_ref())
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.handlers.iter().map(|handler| handler.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The Slack and weather tools wired to the configured upstreams.
    pub fn from_settings(settings: &ServerSettings) -> Self {
        let http = build_http_client(settings);
        let slack = Arc::new(slack::SlackApi::new(
            http.clone(),
            settings.slack_api_base.clone(),
            settings.slack_token.clone(),
        ));
        let nws = Arc::new(weather::NwsApi::new(http, settings.nws_api_base.clone()));

        Self::new()
            .with(slack::ListChannels::new(slack.clone()))
            .with(slack::SendMessage::new(slack.clone()))
            .with(slack::GetMessages::new(slack))
            .with(weather::GetAlerts::new(nws.clone()))
            .with(weather::GetForecast::new(nws))
    }
}

fn build_http_client(settings: &ServerSettings) -> Client {
    Client::builder()
        .timeout(settings.http_timeout)
        .user_agent(settings.user_agent.clone())
        .build()
        .unwrap_or_else(|err| {
            warn!(%err, "Falling back to default HTTP client");
            Client::new()
        })
}
