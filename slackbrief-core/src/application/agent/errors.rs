use crate::application::tooling::ToolInvokeError;
use crate::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("failed to execute tool '{tool}': {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error("no final answer after {max_turns} model turns ({tool_calls} tool calls made)")]
    TurnBudgetExhausted { max_turns: usize, tool_calls: usize },
}
