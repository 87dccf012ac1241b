use crate::config::AppConfig;
use crate::config::defaults::{DEFAULT_MAX_TOKENS, DEFAULT_MAX_TURNS, DEFAULT_MODEL, DEFAULT_PROVIDER_ID};
use crate::types::ChatMessage;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub provider: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub max_turns: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER_ID.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl AgentOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            provider: config.default_provider.clone(),
            model: config.model.clone(),
            max_tokens: Some(config.max_tokens),
            max_turns: config.max_turns,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub call_id: String,
    pub tool: String,
    pub input: Value,
    pub success: bool,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Tool-call annotations in call order, followed by the final text.
    pub transcript: Vec<String>,
    pub response: String,
    pub steps: Vec<AgentStep>,
    pub turns: usize,
    pub messages: Vec<ChatMessage>,
}

impl AgentOutcome {
    /// The newline-joined transcript.
    pub fn render(&self) -> String {
        self.transcript.join("\n")
    }

    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|step| !step.success).count()
    }
}

/// `[Calling tool {name} with args {args}]`
pub fn format_annotation(name: &str, args: &str) -> String {
    format!("[Calling tool {name} with args {args}]")
}
