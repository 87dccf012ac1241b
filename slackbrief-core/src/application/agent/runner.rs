use super::errors::AgentError;
use super::models::{AgentOptions, AgentOutcome, AgentStep, format_annotation};
use crate::application::tooling::{ToolHost, ToolResult};
use crate::model::{ModelProvider, ModelRequest};
use crate::types::{ChatMessage, FunctionSpec, ToolCall};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Runs the tool-calling loop against a borrowed provider and tool host.
///
/// The agent owns nothing: the caller keeps the session alive for the
/// duration of [`Agent::run`] and releases it afterwards.
pub struct Agent<'a, P: ModelProvider + ?Sized> {
    provider: &'a P,
    host: &'a dyn ToolHost,
    tools: &'a [FunctionSpec],
}

/// A tool call whose argument blob has been decoded (or rejected).
enum PreparedCall {
    Ready { input: Value, rendered: String },
    Invalid { reason: String },
}

impl<'a, P: ModelProvider + ?Sized> Agent<'a, P> {
    pub fn new(provider: &'a P, host: &'a dyn ToolHost, tools: &'a [FunctionSpec]) -> Self {
        Self {
            provider,
            host,
            tools,
        }
    }

    pub async fn run(
        &self,
        query: impl Into<String>,
        options: &AgentOptions,
    ) -> Result<AgentOutcome, AgentError> {
        info!(
            provider = %options.provider,
            model = %options.model,
            tools = self.tools.len(),
            "Agent run started"
        );
        let mut messages = vec![ChatMessage::user(query)];
        let mut transcript = Vec::new();
        let mut steps = Vec::new();
        let mut turns = 0usize;

        loop {
            if turns >= options.max_turns {
                warn!(
                    max_turns = options.max_turns,
                    tool_calls = steps.len(),
                    "Agent exhausted its turn budget"
                );
                return Err(AgentError::TurnBudgetExhausted {
                    max_turns: options.max_turns,
                    tool_calls: steps.len(),
                });
            }
            turns += 1;

            debug!(turn = turns, history = messages.len(), "Submitting turn to model provider");
            let request = ModelRequest {
                provider: options.provider.clone(),
                model: options.model.clone(),
                messages: messages.clone(),
                tools: self.tools.to_vec(),
                max_tokens: options.max_tokens,
            };
            let reply = self.provider.chat(request).await?.message;

            if !reply.requests_tools() {
                let text = reply.text().to_string();
                messages.push(reply);
                info!(turns, steps = steps.len(), "Agent returned final response");
                transcript.push(text.clone());
                return Ok(AgentOutcome {
                    transcript,
                    response: text,
                    steps,
                    turns,
                    messages,
                });
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in calls {
                let step = self.execute(&call, &mut transcript).await?;
                messages.push(ChatMessage::tool_result(&call.id, &step.output));
                steps.push(step);
            }
        }
    }

    async fn execute(
        &self,
        call: &ToolCall,
        transcript: &mut Vec<String>,
    ) -> Result<AgentStep, AgentError> {
        let (input, rendered) = match prepare(call) {
            PreparedCall::Ready { input, rendered } => (input, rendered),
            PreparedCall::Invalid { reason } => {
                transcript.push(format_annotation(&call.name, &call.arguments));
                warn!(tool = %call.name, %reason, "Model sent malformed tool arguments");
                return Ok(AgentStep {
                    call_id: call.id.clone(),
                    tool: call.name.clone(),
                    input: Value::String(call.arguments.clone()),
                    success: false,
                    output: format!("Error: invalid arguments for tool '{}': {reason}", call.name),
                });
            }
        };

        transcript.push(format_annotation(&call.name, &rendered));
        info!(tool = %call.name, "Agent requested tool execution");

        let result = match self.host.call_tool(&call.name, input.clone()).await {
            Ok(result) => result,
            Err(err) if err.is_rejection() => {
                warn!(tool = %call.name, error = %err, "Tool host rejected the call");
                ToolResult::failure(format!("Error: {err}"))
            }
            Err(source) => {
                return Err(AgentError::Tool {
                    tool: call.name.clone(),
                    source,
                });
            }
        };

        if result.is_error {
            warn!(tool = %call.name, output = %result.text, "Tool reported an error");
        } else {
            debug!(tool = %call.name, bytes = result.text.len(), "Tool executed");
        }

        Ok(AgentStep {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            input,
            success: !result.is_error,
            output: result.text,
        })
    }
}

fn prepare(call: &ToolCall) -> PreparedCall {
    let blob = call.arguments.trim();
    if blob.is_empty() {
        let input = Value::Object(Map::new());
        let rendered = input.to_string();
        return PreparedCall::Ready { input, rendered };
    }
    match serde_json::from_str::<Value>(blob) {
        Ok(input @ Value::Object(_)) => {
            let rendered = input.to_string();
            PreparedCall::Ready { input, rendered }
        }
        Ok(other) => PreparedCall::Invalid {
            reason: format!("expected a JSON object, got {other}"),
        },
        Err(err) => PreparedCall::Invalid {
            reason: err.to_string(),
        },
    }
}
